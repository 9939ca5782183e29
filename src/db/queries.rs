use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{CalendarEvent, StoredEvent};

const DB_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── Sheet header ──

pub fn get_sheet_header(conn: &Connection) -> anyhow::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM sheet_header ORDER BY position ASC")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut header = vec![];
    for row in rows {
        header.push(row?);
    }
    Ok(header)
}

/// Appends any of `columns` missing from the header, keeping existing
/// positions untouched. Returns the resulting header.
pub fn ensure_sheet_header(conn: &Connection, columns: &[&str]) -> anyhow::Result<Vec<String>> {
    let mut header = get_sheet_header(conn)?;

    for column in columns {
        if header.iter().any(|h| h == column) {
            continue;
        }
        conn.execute(
            "INSERT INTO sheet_header (position, name) VALUES (?1, ?2)",
            params![header.len() as i64, column],
        )?;
        header.push(column.to_string());
    }

    Ok(header)
}

// ── Sheet rows ──

pub fn get_sheet_rows(conn: &Connection) -> anyhow::Result<Vec<(i64, Vec<String>)>> {
    let mut stmt = conn.prepare("SELECT row_index, cells FROM sheet_rows ORDER BY row_index ASC")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut result = vec![];
    for row in rows {
        let (index, cells_json) = row?;
        let cells: Vec<String> = serde_json::from_str(&cells_json)?;
        result.push((index, cells));
    }
    Ok(result)
}

pub fn append_sheet_row(conn: &Connection, cells: &[String]) -> anyhow::Result<i64> {
    let cells_json = serde_json::to_string(cells)?;
    conn.execute(
        "INSERT INTO sheet_rows (cells, updated_at) VALUES (?1, ?2)",
        params![cells_json, now_string()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_sheet_row(conn: &Connection, row_index: i64, cells: &[String]) -> anyhow::Result<bool> {
    let cells_json = serde_json::to_string(cells)?;
    let count = conn.execute(
        "UPDATE sheet_rows SET cells = ?1, updated_at = ?2 WHERE row_index = ?3",
        params![cells_json, now_string(), row_index],
    )?;
    Ok(count > 0)
}

// ── Calendar events ──

pub fn insert_calendar_event(conn: &Connection, id: &str, event: &CalendarEvent) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO calendar_events (id, owner, summary, description, start_at, end_at, time_zone, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id,
            event.owner,
            event.summary,
            event.description,
            event.start.format(DB_TIME_FORMAT).to_string(),
            event.end.format(DB_TIME_FORMAT).to_string(),
            event.time_zone,
            now_string(),
        ],
    )?;
    Ok(())
}

pub fn delete_calendar_event(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM calendar_events WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn get_calendar_events_for_owner(conn: &Connection, owner: &str) -> anyhow::Result<Vec<StoredEvent>> {
    let mut stmt = conn.prepare(
        "SELECT id, owner, summary, description, start_at, end_at, time_zone, created_at
         FROM calendar_events WHERE owner = ?1 ORDER BY start_at ASC",
    )?;

    let rows = stmt.query_map(params![owner], |row| Ok(parse_event_row(row)))?;

    let mut events = vec![];
    for row in rows {
        events.push(row??);
    }
    Ok(events)
}

#[cfg(test)]
pub fn count_calendar_events(conn: &Connection) -> anyhow::Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM calendar_events", [], |row| row.get(0))?;
    Ok(count)
}

fn parse_event_row(row: &rusqlite::Row) -> anyhow::Result<StoredEvent> {
    let id: String = row.get(0)?;
    let owner: String = row.get(1)?;
    let summary: String = row.get(2)?;
    let description: String = row.get(3)?;
    let start_str: String = row.get(4)?;
    let end_str: String = row.get(5)?;
    let time_zone: String = row.get(6)?;
    let created_at_str: String = row.get(7)?;

    let start = NaiveDateTime::parse_from_str(&start_str, DB_TIME_FORMAT)?;
    let end = NaiveDateTime::parse_from_str(&end_str, DB_TIME_FORMAT)?;
    let created_at = NaiveDateTime::parse_from_str(&created_at_str, DB_TIME_FORMAT)
        .unwrap_or_else(|_| Utc::now().naive_utc());

    Ok(StoredEvent {
        id,
        event: CalendarEvent {
            owner,
            summary,
            description,
            start,
            end,
            time_zone,
        },
        created_at,
    })
}

fn now_string() -> String {
    Utc::now().naive_utc().format(DB_TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_header_is_extended_not_reordered() {
        let conn = setup_db();
        ensure_sheet_header(&conn, &["A", "B"]).unwrap();
        let header = ensure_sheet_header(&conn, &["C", "A", "B"]).unwrap();
        assert_eq!(header, vec!["A", "B", "C"]);
        assert_eq!(get_sheet_header(&conn).unwrap(), header);
    }

    #[test]
    fn test_append_and_update_rows() {
        let conn = setup_db();
        let first = append_sheet_row(&conn, &["a".to_string(), "b".to_string()]).unwrap();
        let second = append_sheet_row(&conn, &["c".to_string()]).unwrap();
        assert!(second > first);

        assert!(update_sheet_row(&conn, first, &["x".to_string()]).unwrap());
        assert!(!update_sheet_row(&conn, 999, &["y".to_string()]).unwrap());

        let rows = get_sheet_rows(&conn).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], (first, vec!["x".to_string()]));
        assert_eq!(rows[1], (second, vec!["c".to_string()]));
    }

    #[test]
    fn test_calendar_events_by_owner() {
        let conn = setup_db();
        let event = CalendarEvent {
            owner: "a@x.com".to_string(),
            summary: "Sercan Bey'i ara".to_string(),
            description: "Müşteri: Sercan Bey".to_string(),
            start: dt("2024-01-11 17:00"),
            end: dt("2024-01-11 18:00"),
            time_zone: "Europe/Istanbul".to_string(),
        };
        insert_calendar_event(&conn, "evt-1", &event).unwrap();

        let events = get_calendar_events_for_owner(&conn, "a@x.com").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, event);
        assert!(get_calendar_events_for_owner(&conn, "b@x.com").unwrap().is_empty());

        assert!(delete_calendar_event(&conn, "evt-1").unwrap());
        assert!(!delete_calendar_event(&conn, "evt-1").unwrap());
        assert_eq!(count_calendar_events(&conn).unwrap(), 0);
    }
}
