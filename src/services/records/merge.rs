use chrono::NaiveDateTime;

use crate::models::fields::is_unspecified;
use crate::models::{CustomerRecord, ExtractedFields, Field, MergePolicy};

pub const ENTRY_SEPARATOR: &str = "\n---\n";
const ENTRY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Folds a new extraction into an existing record. Unspecified values never
/// overwrite; notes and actions grow as a timestamped history. Owner,
/// creation time and phone (the identity) are left alone.
pub fn merge(existing: &CustomerRecord, incoming: &ExtractedFields, now: NaiveDateTime) -> CustomerRecord {
    let mut merged = existing.clone();

    for (field, value) in incoming.iter() {
        if field == Field::Phone || is_unspecified(value) {
            continue;
        }

        match field.merge_policy() {
            MergePolicy::Append => {
                let history = append_entry(merged.fields.get(field), value, now);
                merged.fields.set(field, history);
            }
            MergePolicy::Overwrite => merged.fields.set(field, value),
        }
    }

    merged
}

/// Adds `[timestamp] text` to a free-text log. An empty or unspecified log
/// is replaced by the entry.
pub fn append_entry(log: &str, text: &str, now: NaiveDateTime) -> String {
    let entry = format!("[{}] {}", now.format(ENTRY_TIME_FORMAT), text.trim());
    if is_unspecified(log) {
        entry
    } else {
        format!("{}{ENTRY_SEPARATOR}{entry}", log.trim_end())
    }
}
