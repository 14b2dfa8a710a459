//! Birth-profile persistence, one row per user.

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::chart::BirthProfile;

/// Load a user's birth profile, if one has been saved.
pub fn get_profile(conn: &Connection, user_id: &str) -> Result<Option<BirthProfile>> {
    let row: Option<(String, f64, f64)> = conn
        .query_row(
            "SELECT birth_instant, latitude, longitude FROM user_profiles WHERE user_id = ?1",
            params![user_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;

    match row {
        Some((birth_instant, latitude, longitude)) => Ok(Some(BirthProfile {
            birth_instant: DateTime::parse_from_rfc3339(&birth_instant)?.with_timezone(&Utc),
            latitude,
            longitude,
        })),
        None => Ok(None),
    }
}

/// Save or overwrite a user's birth profile.
pub fn upsert_profile(conn: &Connection, user_id: &str, profile: &BirthProfile) -> Result<()> {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    conn.execute(
        "INSERT INTO user_profiles (user_id, birth_instant, latitude, longitude, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5) \
         ON CONFLICT(user_id) DO UPDATE SET \
           birth_instant = excluded.birth_instant, \
           latitude = excluded.latitude, \
           longitude = excluded.longitude, \
           updated_at = excluded.updated_at",
        params![
            user_id,
            profile
                .birth_instant
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            profile.latitude,
            profile.longitude,
            now,
        ],
    )?;
    Ok(())
}
