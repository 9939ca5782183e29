use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use async_trait::async_trait;
use rusqlite::Connection;

use super::{RecordStore, RowKey};
use crate::db::queries;
use crate::models::record::columns;
use crate::models::CustomerRecord;

/// Spreadsheet-shaped store: one header row naming the columns and data
/// rows whose cells follow the header order at write time.
pub struct SheetStore {
    db: Arc<Mutex<Connection>>,
}

impl SheetStore {
    pub fn new(db: Arc<Mutex<Connection>>) -> anyhow::Result<Self> {
        {
            let conn = db
                .lock()
                .map_err(|_| anyhow::anyhow!("database lock poisoned"))?;
            let header = queries::ensure_sheet_header(&conn, &columns())
                .context("failed to prepare sheet header")?;
            tracing::debug!(columns = header.len(), "sheet header ready");
        }
        Ok(Self { db })
    }

    fn conn(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.db
            .lock()
            .map_err(|_| anyhow::anyhow!("database lock poisoned"))
    }
}

fn render_row(header: &[String], record: &CustomerRecord) -> Vec<String> {
    let mut cells: HashMap<&str, String> = record.to_cells().into_iter().collect();
    header
        .iter()
        .map(|name| cells.remove(name.as_str()).unwrap_or_default())
        .collect()
}

fn read_row(header: &[String], cells: Vec<String>) -> CustomerRecord {
    let mapped: HashMap<String, String> = header.iter().cloned().zip(cells).collect();
    CustomerRecord::from_cells(&mapped)
}

#[async_trait]
impl RecordStore for SheetStore {
    async fn list(&self, owner: &str) -> anyhow::Result<Vec<(RowKey, CustomerRecord)>> {
        let conn = self.conn()?;
        let header = queries::get_sheet_header(&conn)?;
        let rows = queries::get_sheet_rows(&conn)?;

        Ok(rows
            .into_iter()
            .map(|(index, cells)| (RowKey::new(index), read_row(&header, cells)))
            .filter(|(_, record)| record.owner == owner)
            .collect())
    }

    async fn append(&self, record: &CustomerRecord) -> anyhow::Result<RowKey> {
        let conn = self.conn()?;
        let header = queries::get_sheet_header(&conn)?;
        let index = queries::append_sheet_row(&conn, &render_row(&header, record))
            .context("failed to append sheet row")?;
        Ok(RowKey::new(index))
    }

    async fn update(&self, key: RowKey, record: &CustomerRecord) -> anyhow::Result<()> {
        let conn = self.conn()?;
        let header = queries::get_sheet_header(&conn)?;
        let updated = queries::update_sheet_row(&conn, key.raw(), &render_row(&header, record))
            .context("failed to update sheet row")?;
        anyhow::ensure!(updated, "sheet row {} does not exist", key.raw());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{ExtractedFields, Field};
    use chrono::NaiveDateTime;

    fn store() -> SheetStore {
        let conn = db::init_db(":memory:").unwrap();
        SheetStore::new(Arc::new(Mutex::new(conn))).unwrap()
    }

    fn record(owner: &str, phone: &str) -> CustomerRecord {
        let now = NaiveDateTime::parse_from_str("2024-01-10 09:00", "%Y-%m-%d %H:%M").unwrap();
        CustomerRecord::new(owner, ExtractedFields::new().with(Field::Phone, phone), now)
    }

    #[tokio::test]
    async fn test_append_then_list_by_owner() {
        let store = store();
        store.append(&record("a@x.com", "555")).await.unwrap();
        store.append(&record("b@x.com", "555")).await.unwrap();
        store.append(&record("a@x.com", "666")).await.unwrap();

        let rows = store.list("a@x.com").await.unwrap();
        let phones: Vec<&str> = rows.iter().map(|(_, r)| r.phone()).collect();
        assert_eq!(phones, vec!["555", "666"]);
    }

    #[tokio::test]
    async fn test_update_replaces_row_in_place() {
        let store = store();
        let key = store.append(&record("a@x.com", "555")).await.unwrap();

        let mut changed = record("a@x.com", "555");
        changed.fields.set(Field::CustomerName, "Sercan Bey");
        changed.event_id = "evt-9".to_string();
        store.update(key, &changed).await.unwrap();

        let rows = store.list("a@x.com").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, key);
        assert_eq!(rows[0].1, changed);
    }

    #[tokio::test]
    async fn test_update_missing_row_fails() {
        let store = store();
        assert!(store.update(RowKey::new(42), &record("a@x.com", "555")).await.is_err());
    }

    #[test]
    fn test_render_follows_stored_header() {
        let header = vec![
            "Telefon".to_string(),
            "Bilinmeyen".to_string(),
            "Sahip".to_string(),
        ];
        let cells = render_row(&header, &record("a@x.com", "555"));
        assert_eq!(cells, vec!["555", "", "a@x.com"]);
    }
}
