use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;

use super::{CalendarError, CalendarProvider};
use crate::db::queries;
use crate::models::{CalendarEvent, StoredEvent};

const ICS_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Calendar kept in the service's own database and published as an
/// iCalendar feed, for agents who subscribe from their phone.
pub struct LocalCalendar {
    db: Arc<Mutex<Connection>>,
}

impl LocalCalendar {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }
}

fn unavailable(err: impl std::fmt::Display) -> CalendarError {
    CalendarError::Unavailable(err.to_string())
}

#[async_trait]
impl CalendarProvider for LocalCalendar {
    async fn insert_event(&self, event: &CalendarEvent) -> Result<String, CalendarError> {
        let id = uuid::Uuid::new_v4().to_string();
        let conn = self.db.lock().map_err(|_| unavailable("database lock poisoned"))?;
        queries::insert_calendar_event(&conn, &id, event).map_err(unavailable)?;
        Ok(id)
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), CalendarError> {
        let conn = self.db.lock().map_err(|_| unavailable("database lock poisoned"))?;
        if queries::delete_calendar_event(&conn, event_id).map_err(unavailable)? {
            Ok(())
        } else {
            Err(CalendarError::NotFound)
        }
    }
}

pub fn generate_feed(events: &[StoredEvent], calendar_name: &str) -> String {
    let mut ics = format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Emlak CRM//Hatirlatmalar//TR\r\n\
         X-WR-CALNAME:{}\r\n",
        escape_text(calendar_name)
    );

    for stored in events {
        let event = &stored.event;
        ics.push_str(&format!(
            "BEGIN:VEVENT\r\n\
             UID:{uid}@emlak-crm\r\n\
             DTSTAMP:{dtstamp}\r\n\
             DTSTART;TZID={tz}:{dtstart}\r\n\
             DTEND;TZID={tz}:{dtend}\r\n\
             SUMMARY:{summary}\r\n\
             DESCRIPTION:{description}\r\n\
             END:VEVENT\r\n",
            uid = stored.id,
            dtstamp = stored.created_at.format(ICS_TIME_FORMAT),
            tz = event.time_zone,
            dtstart = event.start.format(ICS_TIME_FORMAT),
            dtend = event.end.format(ICS_TIME_FORMAT),
            summary = escape_text(&event.summary),
            description = escape_text(&event.description),
        ));
    }

    ics.push_str("END:VCALENDAR\r\n");
    ics
}

/// RFC 5545 TEXT escaping.
fn escape_text(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace("\r\n", "\\n")
        .replace('\n', "\\n")
}
