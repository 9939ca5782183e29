use std::collections::HashMap;

/// Maps a request credential to the agent (owner e-mail) it belongs to.
pub trait IdentityProvider: Send + Sync {
    fn owner_for_token(&self, token: &str) -> Option<String>;
}

/// Fixed token table, parsed from `token=email,token=email`.
pub struct StaticIdentity {
    tokens: HashMap<String, String>,
}

impl StaticIdentity {
    pub fn from_pairs(pairs: &str) -> Self {
        let tokens = pairs
            .split(',')
            .filter_map(|pair| {
                let (token, email) = pair.split_once('=')?;
                let (token, email) = (token.trim(), email.trim());
                if token.is_empty() || email.is_empty() {
                    tracing::warn!("ignoring malformed agent token entry");
                    return None;
                }
                Some((token.to_string(), email.to_lowercase()))
            })
            .collect();
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl IdentityProvider for StaticIdentity {
    fn owner_for_token(&self, token: &str) -> Option<String> {
        self.tokens.get(token).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_pairs() {
        let identity = StaticIdentity::from_pairs("tok-a=A@x.com, tok-b = b@x.com,broken,=c@x.com");
        assert_eq!(identity.len(), 2);
        assert_eq!(identity.owner_for_token("tok-a"), Some("a@x.com".to_string()));
        assert_eq!(identity.owner_for_token("tok-b"), Some("b@x.com".to_string()));
        assert_eq!(identity.owner_for_token("broken"), None);
    }

    #[test]
    fn test_empty_pairs() {
        assert!(StaticIdentity::from_pairs("").is_empty());
    }
}
