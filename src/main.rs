use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use emlak_crm::config::AppConfig;
use emlak_crm::db;
use emlak_crm::handlers;
use emlak_crm::services::ai::gemini::GeminiProvider;
use emlak_crm::services::ai::ollama::OllamaProvider;
use emlak_crm::services::ai::LlmProvider;
use emlak_crm::services::calendar::google::GoogleCalendar;
use emlak_crm::services::calendar::local::LocalCalendar;
use emlak_crm::services::calendar::CalendarProvider;
use emlak_crm::services::identity::StaticIdentity;
use emlak_crm::services::locks::KeyedLocks;
use emlak_crm::services::records::sheet::SheetStore;
use emlak_crm::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    let timeout = Duration::from_secs(config.http_timeout_secs);

    let db = Arc::new(Mutex::new(db::init_db(&config.database_url)?));

    let llm: Box<dyn LlmProvider> = match config.llm_provider.as_str() {
        "ollama" => {
            tracing::info!("using Ollama LLM provider (url: {}, model: {})", config.ollama_url, config.ollama_model);
            Box::new(OllamaProvider::new(
                config.ollama_url.clone(),
                config.ollama_model.clone(),
                timeout,
            ))
        }
        _ => {
            anyhow::ensure!(
                !config.gemini_api_key.is_empty(),
                "GEMINI_API_KEY must be set when LLM_PROVIDER=gemini"
            );
            tracing::info!("using Gemini LLM provider (model: {})", config.gemini_model);
            Box::new(GeminiProvider::new(
                config.gemini_api_key.clone(),
                config.gemini_model.clone(),
                timeout,
            ))
        }
    };

    let calendar: Box<dyn CalendarProvider> = match config.calendar_provider.as_str() {
        "google" => {
            anyhow::ensure!(
                !config.google_access_token.is_empty(),
                "GOOGLE_ACCESS_TOKEN must be set when CALENDAR_PROVIDER=google"
            );
            tracing::info!("using Google Calendar (calendar: {})", config.google_calendar_id);
            Box::new(GoogleCalendar::new(
                config.google_calendar_id.clone(),
                config.google_access_token.clone(),
                timeout,
            ))
        }
        _ => {
            tracing::info!("using local calendar, feed at /calendar/feed.ics");
            Box::new(LocalCalendar::new(Arc::clone(&db)))
        }
    };

    let identity = StaticIdentity::from_pairs(&config.agent_tokens);
    if identity.is_empty() {
        tracing::warn!("AGENT_TOKENS is empty, every request will be rejected");
    } else {
        tracing::info!(agents = identity.len(), "loaded agent tokens");
    }

    let store = SheetStore::new(Arc::clone(&db))?;

    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        llm,
        store: Box::new(store),
        calendar,
        identity: Box::new(identity),
        locks: KeyedLocks::new(),
    });

    let app = handlers::app(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
