use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::services::ai::LlmProvider;
use crate::services::calendar::CalendarProvider;
use crate::services::identity::IdentityProvider;
use crate::services::locks::KeyedLocks;
use crate::services::records::RecordStore;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub llm: Box<dyn LlmProvider>,
    pub store: Box<dyn RecordStore>,
    pub calendar: Box<dyn CalendarProvider>,
    pub identity: Box<dyn IdentityProvider>,
    pub locks: KeyedLocks,
}
