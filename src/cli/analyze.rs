//! CLI `analyze` command — the cache-aware consumer of the fate-analysis
//! pipeline.
//!
//! Mirrors the panel flow: try the cache before invoking the pipeline;
//! `--refresh` invalidates first and always recomputes.

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::warn;

use lifechart::analysis::{
    self, cache, AnalysisKind, AnalysisPayload, FingerprintContext, GeminiClient, ALL_KINDS,
};
use lifechart::chart::compute_chart;
use lifechart::config::LifechartConfig;
use lifechart::{db, events, profile};

/// Run analysis for one horizon, or all four when `kind` is `None`.
pub async fn run(
    config: &LifechartConfig,
    user: &str,
    kind: Option<AnalysisKind>,
    refresh: bool,
) -> Result<()> {
    let conn = db::open_database(config.resolved_db_path())?;
    let birth_profile = profile::get_profile(&conn, user)?
        .context("no birth profile saved; run `lifechart profile set` first")?;
    let chart = compute_chart(&birth_profile);
    let history = events::list_events(&conn, user)?;
    let generator = GeminiClient::new(&config.gemini)?;

    match kind {
        Some(kind) => {
            let ctx = FingerprintContext::new(birth_profile.birth_instant, &history, Utc::now());
            if refresh {
                cache::invalidate(&conn, user, kind)?;
            } else if let Some(hit) = cache::get(&conn, user, kind, &ctx) {
                println!("(cached, updated {})", hit.updated_at);
                print_payload(kind, &hit.payload);
                return Ok(());
            }

            let payload =
                analysis::analyze(&generator, &config.gemini, &chart, &history, kind).await;
            if let Err(err) = cache::put(&conn, user, kind, &payload, &ctx) {
                warn!(user, kind = %kind, error = %err, "failed to persist analysis");
            }
            print_payload(kind, &payload);
        }
        None => {
            let now = Utc::now();
            let ctx = FingerprintContext::new(birth_profile.birth_instant, &history, now);
            if refresh {
                for kind in ALL_KINDS {
                    cache::invalidate(&conn, user, kind)?;
                }
            }

            // Fresh horizons come straight from the cache; only the misses
            // reach the pipeline.
            let mut missed = Vec::new();
            for kind in ALL_KINDS {
                match cache::get(&conn, user, kind, &ctx) {
                    Some(hit) => {
                        println!("(cached, updated {})", hit.updated_at);
                        print_payload(kind, &hit.payload);
                    }
                    None => missed.push(kind),
                }
            }
            if missed.is_empty() {
                return Ok(());
            }

            let results = analysis::analyze_kinds(
                &generator,
                &config.gemini,
                &conn,
                user,
                &chart,
                &history,
                &missed,
                now,
            )
            .await;
            for (kind, payload) in &results {
                print_payload(*kind, payload);
            }
        }
    }
    Ok(())
}

fn print_payload(kind: AnalysisKind, payload: &AnalysisPayload) {
    println!();
    println!("[{kind}]");
    println!("{}", "=".repeat(50));
    match payload {
        AnalysisPayload::Result(result) => {
            println!("{}", result.future_guidance.paragraph1);
            if !result.future_guidance.paragraph2.is_empty() {
                println!();
                println!("{}", result.future_guidance.paragraph2);
            }
            println!();
            println!("Spirituality index: {}", result.spirituality_index);
            for section in [&result.career, &result.emotion, &result.energy] {
                println!();
                println!("{}:", section.title);
                println!("  {}", section.content);
            }
            if !result.key_nodes.is_empty() {
                println!();
                println!("Key moments:");
                for node in &result.key_nodes {
                    println!("  {} — {}", node.date, node.description);
                }
            }
        }
        AnalysisPayload::Error { error } => {
            println!("Error: {error}");
        }
    }
}
