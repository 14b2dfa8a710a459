//! SQL DDL for all lifechart tables.
//!
//! Defines the `user_profiles`, `life_events`, and `analysis_cache` tables.
//! All DDL uses `IF NOT EXISTS` for idempotent initialization.

use rusqlite::Connection;

/// All schema DDL statements for lifechart's core tables.
const SCHEMA_SQL: &str = r#"
-- Birth profile, one row per user
CREATE TABLE IF NOT EXISTS user_profiles (
    user_id TEXT PRIMARY KEY,
    birth_instant TEXT NOT NULL,
    latitude REAL NOT NULL CHECK(latitude >= -90.0 AND latitude <= 90.0),
    longitude REAL NOT NULL CHECK(longitude >= -180.0 AND longitude <= 180.0),
    updated_at TEXT NOT NULL
);

-- Life event records (achievements, wishes, general events)
CREATE TABLE IF NOT EXISTS life_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    date TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_life_events_user ON life_events(user_id);
CREATE INDEX IF NOT EXISTS idx_life_events_date ON life_events(date);

-- Per-horizon AI analysis cache
CREATE TABLE IF NOT EXISTS analysis_cache (
    user_id TEXT NOT NULL,
    analysis_kind TEXT NOT NULL CHECK(analysis_kind IN ('past','next7days','monthly','yearly')),
    fingerprint TEXT NOT NULL,
    payload TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(user_id, analysis_kind)
);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}
