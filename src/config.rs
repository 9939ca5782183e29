use std::env;

use chrono::{FixedOffset, NaiveDateTime, Offset, Utc};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub llm_provider: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub calendar_provider: String,
    pub google_calendar_id: String,
    pub google_access_token: String,
    pub time_zone: String,
    pub utc_offset_minutes: i32,
    pub http_timeout_secs: u64,
    /// `token=email` pairs separated by commas.
    pub agent_tokens: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "emlak_crm.db".to_string()),
            llm_provider: env::var("LLM_PROVIDER").unwrap_or_else(|_| "gemini".to_string()),
            gemini_api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
            gemini_model: env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-pro".to_string()),
            ollama_url: env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            ollama_model: env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string()),
            calendar_provider: env::var("CALENDAR_PROVIDER").unwrap_or_else(|_| "local".to_string()),
            google_calendar_id: env::var("GOOGLE_CALENDAR_ID")
                .unwrap_or_else(|_| "primary".to_string()),
            google_access_token: env::var("GOOGLE_ACCESS_TOKEN").unwrap_or_default(),
            time_zone: env::var("TIME_ZONE").unwrap_or_else(|_| "Europe/Istanbul".to_string()),
            utc_offset_minutes: env::var("UTC_OFFSET_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(180),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            agent_tokens: env::var("AGENT_TOKENS").unwrap_or_default(),
        }
    }

    /// Wall-clock time in the agents' local zone.
    pub fn local_now(&self) -> NaiveDateTime {
        let offset = FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix());
        Utc::now().with_timezone(&offset).naive_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_now_applies_offset() {
        let mut config = AppConfig::from_env();
        config.utc_offset_minutes = 180;
        let utc = Utc::now().naive_utc();
        let local = config.local_now();
        let diff = (local - utc).num_minutes();
        assert!((179..=181).contains(&diff), "unexpected offset {diff}");
    }
}
