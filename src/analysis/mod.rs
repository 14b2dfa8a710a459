//! Fate-analysis pipeline and cache store.
//!
//! [`analyze`] is the single entry point: API-key gate → prompt build →
//! retrying transport → response normalization. It never returns an error to
//! the caller; every failure mode collapses into an error-shaped
//! [`AnalysisPayload`]. [`analyze_kinds`] runs a set of horizons concurrently
//! and persists each result independently; [`analyze_all`] is the
//! all-four-horizons convenience over it.

pub mod cache;
pub mod client;
pub mod parse;
pub mod prompt;
pub mod types;

use chrono::{DateTime, Utc};
use futures::future;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::chart::ChartSnapshot;
use crate::config::GeminiConfig;
use crate::events::EventRecord;

pub use cache::{fingerprint, CachedAnalysis, FingerprintContext};
pub use client::{GeminiClient, GenerateError, RetryPolicy, TextGenerator};
pub use parse::{parse_analysis, ParsedAnalysis};
pub use types::{AnalysisKind, AnalysisPayload, AnalysisResult, ALL_KINDS};

/// Sentinel value shipped in config templates; treated the same as no key.
const PLACEHOLDER_API_KEY: &str = "your_gemini_api_key";

fn api_key_missing(config: &GeminiConfig) -> bool {
    config.api_key.is_empty() || config.api_key == PLACEHOLDER_API_KEY
}

/// Run the full analysis pipeline for one horizon.
///
/// A missing or placeholder API key short-circuits before any network call.
/// Request-level failures (after retries) surface as
/// [`AnalysisPayload::Error`]; unparseable model output degrades to the
/// placeholder fallback result, which is still a structurally valid
/// [`AnalysisResult`].
pub async fn analyze(
    generator: &dyn TextGenerator,
    config: &GeminiConfig,
    chart: &ChartSnapshot,
    events: &[EventRecord],
    kind: AnalysisKind,
) -> AnalysisPayload {
    if api_key_missing(config) {
        return AnalysisPayload::Error {
            error: "Gemini API key is not configured; set gemini.api_key or GEMINI_API_KEY."
                .into(),
        };
    }

    let prompt = prompt::build_prompt(chart, events, kind, Utc::now());
    let policy = RetryPolicy::from(config);

    match client::generate_with_retry(generator, &prompt, &policy).await {
        Ok(text) => {
            let parsed = parse_analysis(&text);
            if parsed.fallback {
                warn!(kind = %kind, "analysis degraded to fallback result");
            } else {
                info!(kind = %kind, "analysis completed");
            }
            AnalysisPayload::Result(parsed.result)
        }
        Err(err) => {
            warn!(kind = %kind, error = %err, "analysis request failed");
            AnalysisPayload::Error {
                error: format!("analysis failed: {err}"),
            }
        }
    }
}

/// Analyze the given horizons concurrently and cache each result.
///
/// The pipeline runs are joined before any persistence; each cache write is
/// independent — one horizon's write failure is logged and does not affect
/// the others. `now` fixes the fingerprint bucket for every write, so a
/// batch straddling a bucket boundary stores one consistent generation.
/// Returns the payloads in the order of `kinds`.
pub async fn analyze_kinds(
    generator: &dyn TextGenerator,
    config: &GeminiConfig,
    conn: &Connection,
    user_id: &str,
    chart: &ChartSnapshot,
    events: &[EventRecord],
    kinds: &[AnalysisKind],
    now: DateTime<Utc>,
) -> Vec<(AnalysisKind, AnalysisPayload)> {
    let payloads = future::join_all(
        kinds
            .iter()
            .map(|&kind| analyze(generator, config, chart, events, kind)),
    )
    .await;

    let ctx = FingerprintContext::new(chart.profile.birth_instant, events, now);
    let results: Vec<_> = kinds.iter().copied().zip(payloads).collect();
    for (kind, payload) in &results {
        if let Err(err) = cache::put(conn, user_id, *kind, payload, &ctx) {
            warn!(user_id, kind = %kind, error = %err, "failed to persist analysis");
        }
    }
    results
}

/// Analyze all four horizons concurrently and cache each result.
pub async fn analyze_all(
    generator: &dyn TextGenerator,
    config: &GeminiConfig,
    conn: &Connection,
    user_id: &str,
    chart: &ChartSnapshot,
    events: &[EventRecord],
    now: DateTime<Utc>,
) -> Vec<(AnalysisKind, AnalysisPayload)> {
    analyze_kinds(generator, config, conn, user_id, chart, events, &ALL_KINDS, now).await
}
