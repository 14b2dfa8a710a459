//! CLI `cache` commands — inspect and clear the analysis cache.

use anyhow::Result;
use rusqlite::params;

use lifechart::analysis::{cache, AnalysisKind, ALL_KINDS};
use lifechart::config::LifechartConfig;
use lifechart::db;

/// Show the stored cache rows for a user.
pub fn inspect(config: &LifechartConfig, user: &str) -> Result<()> {
    let conn = db::open_database(config.resolved_db_path())?;
    let mut stmt = conn.prepare(
        "SELECT analysis_kind, fingerprint, updated_at, LENGTH(payload) \
         FROM analysis_cache WHERE user_id = ?1 ORDER BY analysis_kind",
    )?;
    let rows: Vec<(String, String, String, i64)> = stmt
        .query_map(params![user], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    if rows.is_empty() {
        println!("No cached analyses for {user}");
        return Ok(());
    }

    println!("Cached analyses for {user}:");
    for (kind, fingerprint, updated_at, payload_len) in rows {
        println!("  {kind:<10} updated {updated_at}  ({payload_len} bytes)");
        println!("             fingerprint: {fingerprint}");
    }
    Ok(())
}

/// Remove cached analyses — one horizon, or all when `kind` is `None`.
pub fn clear(config: &LifechartConfig, user: &str, kind: Option<AnalysisKind>) -> Result<()> {
    let conn = db::open_database(config.resolved_db_path())?;
    match kind {
        Some(kind) => {
            cache::invalidate(&conn, user, kind)?;
            println!("Cleared {kind} analysis for {user}");
        }
        None => {
            for kind in ALL_KINDS {
                cache::invalidate(&conn, user, kind)?;
            }
            println!("Cleared all cached analyses for {user}");
        }
    }
    Ok(())
}
