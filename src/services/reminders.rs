//! Keeps at most one live calendar event per customer record, with the
//! record's event id pointing at it.

use chrono::{Duration, NaiveDateTime};

use crate::models::fields::is_unspecified;
use crate::models::{CalendarEvent, CustomerRecord, Field};
use crate::services::calendar::{CalendarError, CalendarProvider};
use crate::services::records::merge::ENTRY_SEPARATOR;

const UNTITLED_TASK: &str = "İsimsiz Görev";

pub fn event_for(record: &CustomerRecord, start: NaiveDateTime, time_zone: &str) -> CalendarEvent {
    let summary = latest_entry(record.fields.get(Field::Actions))
        .unwrap_or(UNTITLED_TASK)
        .to_string();

    let description = format!(
        "Müşteri: {}\nTelefon: {}\n\nNotlar:\n{}",
        record.customer_name(),
        record.phone(),
        record.fields.get(Field::Notes),
    );

    CalendarEvent {
        owner: record.owner.clone(),
        summary,
        description,
        start,
        end: start + Duration::hours(1),
        time_zone: time_zone.to_string(),
    }
}

/// Newest entry of an appended action log, without its timestamp prefix.
fn latest_entry(actions: &str) -> Option<&str> {
    if is_unspecified(actions) {
        return None;
    }
    let last = actions
        .rsplit(ENTRY_SEPARATOR)
        .next()
        .unwrap_or(actions);
    let text = match last.strip_prefix('[').and_then(|rest| rest.split_once("] ")) {
        Some((_, text)) => text,
        None => last,
    };
    Some(text.trim()).filter(|t| !t.is_empty())
}

/// Points the record at a fresh event for `reminder_at`. A missing reminder
/// leaves any existing event alone. The old event is deleted before the new
/// one is created; the record's event id is updated after each step so a
/// failure midway never leaves it pointing at a deleted event.
pub async fn upsert(
    calendar: &dyn CalendarProvider,
    record: &mut CustomerRecord,
    reminder_at: Option<NaiveDateTime>,
    time_zone: &str,
) -> Result<(), CalendarError> {
    let Some(start) = reminder_at else {
        return Ok(());
    };

    if record.has_event() {
        delete_tolerating_missing(calendar, &record.event_id).await?;
        record.event_id.clear();
    }

    let event_id = calendar
        .insert_event(&event_for(record, start, time_zone))
        .await?;
    record.event_id = event_id;
    Ok(())
}

/// Deletes the record's active event, if any, and clears its id.
pub async fn complete(
    calendar: &dyn CalendarProvider,
    record: &mut CustomerRecord,
) -> Result<(), CalendarError> {
    if record.has_event() {
        delete_tolerating_missing(calendar, &record.event_id).await?;
        record.event_id.clear();
    }
    Ok(())
}

async fn delete_tolerating_missing(
    calendar: &dyn CalendarProvider,
    event_id: &str,
) -> Result<(), CalendarError> {
    match calendar.delete_event(event_id).await {
        Ok(()) => Ok(()),
        Err(CalendarError::NotFound) => {
            tracing::debug!(event_id, "calendar event already gone");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
