use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};

use crate::errors::AppError;
use crate::state::AppState;

/// The agent e-mail resolved from the request's bearer token.
#[derive(Debug, Clone)]
pub struct Owner(pub String);

fn bearer_token(headers: &HeaderMap) -> &str {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .unwrap_or("")
}

pub fn resolve_owner(state: &AppState, token: &str) -> Result<String, AppError> {
    if token.is_empty() {
        return Err(AppError::Unauthorized);
    }
    state.identity.owner_for_token(token).ok_or_else(|| {
        tracing::warn!("rejected unknown bearer token");
        AppError::Unauthorized
    })
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Owner {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        resolve_owner(state, bearer_token(&parts.headers)).map(Owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), "");

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer tok-a"));
        assert_eq!(bearer_token(&headers), "tok-a");

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), "");
    }
}
