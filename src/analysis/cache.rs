//! Analysis cache store — fingerprint derivation and the get/put/invalidate
//! operations over the `analysis_cache` table.
//!
//! Staleness is detected lazily: `get` recomputes the fingerprint from the
//! current context and treats any mismatch with the stored one as a miss.
//! There is no expiry job; time-bucketed horizons roll over because their
//! bucket key changes with the wall clock.

use anyhow::Result;
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

use crate::analysis::types::{AnalysisKind, AnalysisPayload};
use crate::events::EventRecord;

/// Inputs the fingerprint is derived from. `now` is a parameter so tests can
/// pin the bucket clock; production callers pass `Utc::now()`.
#[derive(Debug, Clone)]
pub struct FingerprintContext {
    pub birth_instant: DateTime<Utc>,
    pub event_count: usize,
    /// Newest event timestamp in unix milliseconds, 0 if no events.
    pub latest_event_millis: i64,
    pub now: DateTime<Utc>,
}

impl FingerprintContext {
    /// Build a context from a profile's birth instant and the event history.
    pub fn new(
        birth_instant: DateTime<Utc>,
        events: &[EventRecord],
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            birth_instant,
            event_count: events.len(),
            latest_event_millis: crate::events::latest_activity_millis(events),
            now,
        }
    }
}

/// A stored cache record.
#[derive(Debug, Clone)]
pub struct CachedAnalysis {
    pub user_id: String,
    pub kind: AnalysisKind,
    pub fingerprint: String,
    pub payload: AnalysisPayload,
    pub updated_at: String,
}

/// Wall-clock bucket key for a horizon. Past and monthly roll over monthly,
/// next7days daily, yearly once a year.
fn bucket_key(kind: AnalysisKind, now: DateTime<Utc>) -> String {
    match kind {
        AnalysisKind::Past | AnalysisKind::Monthly => {
            format!("{:04}-{:02}", now.year(), now.month())
        }
        AnalysisKind::Next7Days => {
            format!("{:04}-{:02}-{:02}", now.year(), now.month(), now.day())
        }
        AnalysisKind::Yearly => format!("{:04}", now.year()),
    }
}

/// Deterministic staleness fingerprint. Only equality matters; any change in
/// horizon, birthday, event count, time bucket, or newest event timestamp
/// produces a different value.
pub fn fingerprint(kind: AnalysisKind, ctx: &FingerprintContext) -> String {
    format!(
        "{}_{}_{}_{}_{}",
        kind.as_str(),
        ctx.birth_instant.to_rfc3339_opts(SecondsFormat::Secs, true),
        ctx.event_count,
        bucket_key(kind, ctx.now),
        ctx.latest_event_millis,
    )
}

/// Read the cached analysis for (user, kind), returning it only when the
/// stored fingerprint matches the one recomputed from `ctx`.
///
/// Store errors are logged and degrade to a miss — caching is an
/// optimization, not a correctness requirement.
pub fn get(
    conn: &Connection,
    user_id: &str,
    kind: AnalysisKind,
    ctx: &FingerprintContext,
) -> Option<CachedAnalysis> {
    match try_get(conn, user_id, kind, ctx) {
        Ok(hit) => hit,
        Err(err) => {
            warn!(user_id, kind = %kind, error = %err, "cache read failed, treating as miss");
            None
        }
    }
}

fn try_get(
    conn: &Connection,
    user_id: &str,
    kind: AnalysisKind,
    ctx: &FingerprintContext,
) -> Result<Option<CachedAnalysis>> {
    let row: Option<(String, String, String)> = conn
        .query_row(
            "SELECT fingerprint, payload, updated_at FROM analysis_cache \
             WHERE user_id = ?1 AND analysis_kind = ?2",
            params![user_id, kind.as_str()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;

    let Some((stored_fingerprint, payload_json, updated_at)) = row else {
        return Ok(None);
    };

    let expected = fingerprint(kind, ctx);
    if stored_fingerprint != expected {
        debug!(user_id, kind = %kind, "fingerprint mismatch, cache is stale");
        return Ok(None);
    }

    let payload: AnalysisPayload = serde_json::from_str(&payload_json)?;
    Ok(Some(CachedAnalysis {
        user_id: user_id.to_string(),
        kind,
        fingerprint: stored_fingerprint,
        payload,
        updated_at,
    }))
}

/// Upsert the analysis for (user, kind) under the fingerprint derived from
/// `ctx`. Overwrites any existing record.
pub fn put(
    conn: &Connection,
    user_id: &str,
    kind: AnalysisKind,
    payload: &AnalysisPayload,
    ctx: &FingerprintContext,
) -> Result<CachedAnalysis> {
    let fp = fingerprint(kind, ctx);
    let payload_json = serde_json::to_string(payload)?;
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

    conn.execute(
        "INSERT INTO analysis_cache (user_id, analysis_kind, fingerprint, payload, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5) \
         ON CONFLICT(user_id, analysis_kind) DO UPDATE SET \
           fingerprint = excluded.fingerprint, \
           payload = excluded.payload, \
           updated_at = excluded.updated_at",
        params![user_id, kind.as_str(), fp, payload_json, now],
    )?;

    Ok(CachedAnalysis {
        user_id: user_id.to_string(),
        kind,
        fingerprint: fp,
        payload: payload.clone(),
        updated_at: now,
    })
}

/// Unconditionally remove the record for (user, kind). Used by explicit
/// refresh to force recomputation.
pub fn invalidate(conn: &Connection, user_id: &str, kind: AnalysisKind) -> Result<()> {
    conn.execute(
        "DELETE FROM analysis_cache WHERE user_id = ?1 AND analysis_kind = ?2",
        params![user_id, kind.as_str()],
    )?;
    Ok(())
}
