//! Life-event records — the journal entries the analysis pipeline consumes.
//!
//! Events are created by the journaling UI; this core only needs their
//! title/description text and their three timestamps (event date, created,
//! updated), which feed the prompt and the cache fingerprint.

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

/// A single journal entry, matching the `life_events` table schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// When the recorded event happened.
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert a new event for a user. Returns the new row id.
pub fn add_event(
    conn: &Connection,
    user_id: &str,
    title: &str,
    description: &str,
    date: DateTime<Utc>,
) -> Result<i64> {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    conn.execute(
        "INSERT INTO life_events (user_id, title, description, date, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![
            user_id,
            title,
            description,
            date.to_rfc3339_opts(SecondsFormat::Millis, true),
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// All events for a user, most recent event date first.
pub fn list_events(conn: &Connection, user_id: &str) -> Result<Vec<EventRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, description, date, created_at, updated_at \
         FROM life_events WHERE user_id = ?1 ORDER BY date DESC, id DESC",
    )?;
    let rows = stmt
        .query_map(params![user_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut events = Vec::with_capacity(rows.len());
    for (id, title, description, date, created_at, updated_at) in rows {
        events.push(EventRecord {
            id,
            title,
            description,
            date: parse_timestamp(&date)?,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        });
    }
    Ok(events)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

/// Newest timestamp across all events' date/created/updated columns, in unix
/// milliseconds. Returns 0 for an empty history.
pub fn latest_activity_millis(events: &[EventRecord]) -> i64 {
    events
        .iter()
        .flat_map(|e| [e.date, e.created_at, e.updated_at])
        .map(|t| t.timestamp_millis())
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::TimeZone;

    #[test]
    fn add_and_list_roundtrip() {
        let conn = db::open_memory_database().unwrap();
        let date = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let id = add_event(&conn, "u1", "Promotion", "Senior role", date).unwrap();
        assert!(id > 0);

        let events = list_events(&conn, "u1").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Promotion");
        assert_eq!(events[0].date, date);

        // Other users see nothing
        assert!(list_events(&conn, "u2").unwrap().is_empty());
    }

    #[test]
    fn listing_orders_most_recent_first() {
        let conn = db::open_memory_database().unwrap();
        let older = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let newer = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        add_event(&conn, "u1", "old", "", older).unwrap();
        add_event(&conn, "u1", "new", "", newer).unwrap();

        let events = list_events(&conn, "u1").unwrap();
        assert_eq!(events[0].title, "new");
        assert_eq!(events[1].title, "old");
    }

    #[test]
    fn latest_activity_is_zero_when_empty() {
        assert_eq!(latest_activity_millis(&[]), 0);
    }

    #[test]
    fn latest_activity_considers_all_three_timestamps() {
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let events = vec![EventRecord {
            id: 1,
            title: "t".into(),
            description: String::new(),
            date: late, // event date is newest of the three
            created_at: base,
            updated_at: base,
        }];
        assert_eq!(latest_activity_millis(&events), late.timestamp_millis());
    }
}
