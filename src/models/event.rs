use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// What gets sent to the calendar for one reminder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarEvent {
    pub owner: String,
    pub summary: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub time_zone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    pub id: String,
    pub event: CalendarEvent,
    pub created_at: NaiveDateTime,
}
