use std::collections::HashMap;

use chrono::{NaiveDateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::fields::{is_unspecified, ExtractedFields, Field, UNSPECIFIED};

pub const OWNER_COLUMN: &str = "Sahip";
pub const CREATED_AT_COLUMN: &str = "Kayit_Tarihi";
pub const REMINDER_AT_COLUMN: &str = "Hatirlatma_Zamani";
pub const COMPLETED_TASKS_COLUMN: &str = "Tamamlanan_Gorevler";
pub const EVENT_ID_COLUMN: &str = "Takvim_Etkinlik_ID";

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const REMINDER_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Header row of the customer sheet, in write order.
pub fn columns() -> Vec<&'static str> {
    let mut cols = vec![OWNER_COLUMN];
    cols.extend(Field::ALL.iter().map(|f| f.key()));
    cols.extend([
        CREATED_AT_COLUMN,
        REMINDER_AT_COLUMN,
        COMPLETED_TASKS_COLUMN,
        EVENT_ID_COLUMN,
    ]);
    cols
}

/// One customer of one agent. Identity is (owner, normalized phone).
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord {
    pub owner: String,
    pub fields: ExtractedFields,
    pub created_at: NaiveDateTime,
    pub reminder_at: Option<NaiveDateTime>,
    pub completed_tasks: String,
    /// Empty when no calendar event is active.
    pub event_id: String,
}

impl CustomerRecord {
    pub fn new(owner: &str, fields: ExtractedFields, now: NaiveDateTime) -> Self {
        Self {
            owner: owner.to_string(),
            fields,
            created_at: now,
            reminder_at: None,
            completed_tasks: String::new(),
            event_id: String::new(),
        }
    }

    pub fn phone(&self) -> &str {
        self.fields.get(Field::Phone)
    }

    pub fn customer_name(&self) -> &str {
        self.fields.get(Field::CustomerName)
    }

    pub fn has_event(&self) -> bool {
        !self.event_id.trim().is_empty()
    }

    pub fn reminder_text(&self) -> String {
        self.reminder_at
            .map(|dt| dt.format(REMINDER_FORMAT).to_string())
            .unwrap_or_else(|| UNSPECIFIED.to_string())
    }

    /// Cell values keyed by header name.
    pub fn to_cells(&self) -> Vec<(&'static str, String)> {
        let mut cells = vec![(OWNER_COLUMN, self.owner.clone())];
        cells.extend(self.fields.iter().map(|(f, v)| (f.key(), v.to_string())));
        cells.push((
            CREATED_AT_COLUMN,
            self.created_at.format(TIMESTAMP_FORMAT).to_string(),
        ));
        cells.push((REMINDER_AT_COLUMN, self.reminder_text()));
        cells.push((COMPLETED_TASKS_COLUMN, self.completed_tasks.clone()));
        cells.push((EVENT_ID_COLUMN, self.event_id.clone()));
        cells
    }

    pub fn from_cells(cells: &HashMap<String, String>) -> Self {
        let cell = |name: &str| cells.get(name).map(String::as_str).unwrap_or("");

        let mut fields = ExtractedFields::new();
        for field in Field::ALL {
            let value = cell(field.key());
            fields.set(field, if value.is_empty() { UNSPECIFIED } else { value });
        }

        let created_at = NaiveDateTime::parse_from_str(cell(CREATED_AT_COLUMN), TIMESTAMP_FORMAT)
            .unwrap_or_else(|_| Utc::now().naive_utc());
        let reminder_raw = cell(REMINDER_AT_COLUMN);
        let reminder_at = if is_unspecified(reminder_raw) {
            None
        } else {
            NaiveDateTime::parse_from_str(reminder_raw, REMINDER_FORMAT).ok()
        };

        Self {
            owner: cell(OWNER_COLUMN).to_string(),
            fields,
            created_at,
            reminder_at,
            completed_tasks: cell(COMPLETED_TASKS_COLUMN).to_string(),
            event_id: cell(EVENT_ID_COLUMN).to_string(),
        }
    }
}

impl Serialize for CustomerRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let cells = self.to_cells();
        let mut map = serializer.serialize_map(Some(cells.len()))?;
        for (name, value) in &cells {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
