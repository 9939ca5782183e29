use chrono::NaiveDateTime;

use crate::errors::AppError;
use crate::models::fields::is_unspecified;
use crate::models::{CustomerRecord, DailyTask, Field};
use crate::services::ai::{extraction, tasks};
use crate::services::records::{matcher, merge, RowKey};
use crate::services::{dates, phone, reminders};
use crate::state::AppState;

/// Who a task completion is about. A phone with digits wins over the name.
#[derive(Debug, Clone, Default)]
pub struct CompletionTarget {
    pub phone: Option<String>,
    pub customer_name: Option<String>,
}

impl CompletionTarget {
    /// The phone, unless it has no digits to match on ("yok", "-").
    fn usable_phone(&self) -> Option<&str> {
        self.phone
            .as_deref()
            .filter(|p| !phone::normalize(p).is_empty())
    }

    fn usable_name(&self) -> Option<&str> {
        self.customer_name
            .as_deref()
            .filter(|n| !is_unspecified(n))
    }

    fn describe(&self) -> String {
        match (self.usable_phone(), self.usable_name()) {
            (Some(phone), _) => format!("phone {phone}"),
            (None, Some(name)) => format!("customer {name}"),
            (None, None) => "nothing".to_string(),
        }
    }
}

fn store_error(operation: &'static str, owner: &str, err: anyhow::Error) -> AppError {
    tracing::error!(operation, owner, error = %format!("{err:#}"), "record store failure");
    AppError::CollaboratorUnavailable(format!("record store: {err:#}"))
}

/// Transcript → extraction → reminder → match/merge → calendar → store.
pub async fn process_transcript(
    state: &AppState,
    owner: &str,
    transcript: &str,
    now: NaiveDateTime,
) -> Result<CustomerRecord, AppError> {
    let transcript = transcript.trim();
    if transcript.is_empty() {
        return Err(AppError::BadRequest("transcript is required".to_string()));
    }

    let fields = extraction::extract_fields(state.llm.as_ref(), transcript)
        .await
        .inspect_err(|e| tracing::error!(operation = "process", owner, error = %e, "extraction failed"))?;

    let reminder_at = dates::resolve(
        fields.get(Field::ReminderDateText),
        fields.get(Field::ReminderTimeText),
        now,
    );
    let phone = fields.get(Field::Phone).to_string();

    let _guard = state.locks.lock(owner, &phone).await;

    let (keys, records): (Vec<RowKey>, Vec<CustomerRecord>) = state
        .store
        .list(owner)
        .await
        .map_err(|e| store_error("process", owner, e))?
        .into_iter()
        .unzip();

    let (existing_key, mut record) = match matcher::find(&records, owner, &phone) {
        Some((index, existing)) => {
            tracing::info!(owner, phone = %phone, "merging transcript into existing record");
            (Some(keys[index]), merge::merge(existing, &fields, now))
        }
        None => {
            tracing::info!(owner, phone = %phone, "creating new record");
            (None, CustomerRecord::new(owner, fields, now))
        }
    };

    if reminder_at.is_some() {
        record.reminder_at = reminder_at;
    }

    // Calendar trouble must not cost us the customer data.
    if let Err(e) = reminders::upsert(
        state.calendar.as_ref(),
        &mut record,
        reminder_at,
        &state.config.time_zone,
    )
    .await
    {
        tracing::warn!(operation = "process", owner, phone = %phone, error = %e, "calendar update failed");
    }

    let persisted = match existing_key {
        Some(key) => state.store.update(key, &record).await,
        None => state.store.append(&record).await.map(|_| ()),
    };
    persisted.map_err(|e| store_error("process", owner, e))?;

    Ok(record)
}

/// Logs a finished task on the matching record and retires its reminder.
pub async fn complete_task(
    state: &AppState,
    owner: &str,
    target: &CompletionTarget,
    task_text: &str,
    now: NaiveDateTime,
) -> Result<CustomerRecord, AppError> {
    let task_text = task_text.trim();
    if task_text.is_empty() {
        return Err(AppError::BadRequest("task_text is required".to_string()));
    }
    if target.usable_phone().is_none() && target.usable_name().is_none() {
        return Err(AppError::BadRequest(
            "phone or customer_name is required".to_string(),
        ));
    }

    // Find the record once to learn its phone, then re-read under that
    // phone's lock so a concurrent transcript cannot interleave.
    let (_, found) = locate(state, owner, target).await?;
    let _guard = state.locks.lock(owner, found.phone()).await;
    let (key, mut record) = locate(state, owner, target).await?;

    record.completed_tasks = merge::append_entry(&record.completed_tasks, task_text, now);

    if let Err(e) = reminders::complete(state.calendar.as_ref(), &mut record).await {
        tracing::warn!(
            operation = "complete_task",
            owner,
            phone = record.phone(),
            error = %e,
            "failed to delete calendar event"
        );
    }
    record.reminder_at = None;

    state
        .store
        .update(key, &record)
        .await
        .map_err(|e| store_error("complete_task", owner, e))?;

    tracing::info!(owner, phone = record.phone(), "task completed");
    Ok(record)
}

async fn locate(
    state: &AppState,
    owner: &str,
    target: &CompletionTarget,
) -> Result<(RowKey, CustomerRecord), AppError> {
    let (keys, records): (Vec<RowKey>, Vec<CustomerRecord>) = state
        .store
        .list(owner)
        .await
        .map_err(|e| store_error("complete_task", owner, e))?
        .into_iter()
        .unzip();

    let found = match (target.usable_phone(), target.usable_name()) {
        (Some(phone), _) => matcher::find(&records, owner, phone),
        (None, Some(name)) => matcher::find_by_name(&records, owner, name),
        (None, None) => None,
    };

    match found {
        Some((index, record)) => Ok((keys[index], record.clone())),
        None => {
            tracing::warn!(operation = "complete_task", owner, identifier = %target.describe(), "no matching record");
            Err(AppError::RecordNotFound(target.describe()))
        }
    }
}

/// Records whose reminder is due by the end of `now`'s day, prioritized by
/// the model.
pub async fn daily_tasks(
    state: &AppState,
    owner: &str,
    now: NaiveDateTime,
) -> Result<Vec<DailyTask>, AppError> {
    let end_of_day = now.date().and_hms_opt(23, 59, 59).unwrap_or(now);

    let candidates: Vec<CustomerRecord> = state
        .store
        .list(owner)
        .await
        .map_err(|e| store_error("daily_tasks", owner, e))?
        .into_iter()
        .map(|(_, record)| record)
        .filter(|record| record.reminder_at.is_some_and(|at| at <= end_of_day))
        .collect();

    tracing::info!(owner, candidates = candidates.len(), "building daily task list");

    tasks::plan_daily_tasks(state.llm.as_ref(), &candidates, now)
        .await
        .inspect_err(|e| tracing::error!(operation = "daily_tasks", owner, error = %e, "task planning failed"))
}

/// The owner's records, newest first.
pub async fn list_records(state: &AppState, owner: &str) -> Result<Vec<CustomerRecord>, AppError> {
    let mut records: Vec<CustomerRecord> = state
        .store
        .list(owner)
        .await
        .map_err(|e| store_error("list_records", owner, e))?
        .into_iter()
        .map(|(_, record)| record)
        .collect();
    records.reverse();
    Ok(records)
}
