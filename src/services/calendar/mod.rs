pub mod google;
pub mod local;

use async_trait::async_trait;

use crate::models::CalendarEvent;

#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("calendar event not found")]
    NotFound,

    #[error("calendar unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Creates the event and returns its id.
    async fn insert_event(&self, event: &CalendarEvent) -> Result<String, CalendarError>;

    async fn delete_event(&self, event_id: &str) -> Result<(), CalendarError>;
}
