use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use lifechart::analysis::{
    self, cache, AnalysisKind, AnalysisPayload, FingerprintContext, GenerateError, TextGenerator,
};
use lifechart::chart::compute_chart;
use lifechart::config::GeminiConfig;
use lifechart::{db, events, profile};
use std::sync::atomic::{AtomicU32, Ordering};

const VALID_JSON: &str = r#"{
    "futureGuidance": {"paragraph1": "a bright stretch", "paragraph2": "pace yourself"},
    "spiritualityIndex": 73,
    "career": {"title": "Career", "content": "momentum builds"},
    "emotion": {"title": "Emotion", "content": "open conversations"},
    "energy": {"title": "Energy", "content": "steady reserves"},
    "keyNodes": [{"date": "2026-09-03", "description": "a decisive meeting"}]
}"#;

struct ScriptedGenerator {
    calls: AtomicU32,
    text: String,
}

impl ScriptedGenerator {
    fn new(text: &str) -> Self {
        Self {
            calls: AtomicU32::new(0),
            text: text.to_string(),
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

fn gemini_config() -> GeminiConfig {
    GeminiConfig {
        api_key: "test-key".into(),
        backoff_base_ms: 1,
        ..GeminiConfig::default()
    }
}

fn seeded_db() -> rusqlite::Connection {
    let conn = db::open_memory_database().unwrap();
    let birth = lifechart::chart::BirthProfile {
        birth_instant: Utc.with_ymd_and_hms(2000, 6, 15, 8, 30, 0).unwrap(),
        latitude: 39.9042,
        longitude: 116.4074,
    };
    profile::upsert_profile(&conn, "u1", &birth).unwrap();
    events::add_event(
        &conn,
        "u1",
        "Started a new job",
        "engineering role",
        Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap(),
    )
    .unwrap();
    conn
}

#[tokio::test]
async fn miss_analyze_put_then_hit_without_second_request() {
    let conn = seeded_db();
    let birth_profile = profile::get_profile(&conn, "u1").unwrap().unwrap();
    let chart = compute_chart(&birth_profile);
    let history = events::list_events(&conn, "u1").unwrap();
    let generator = ScriptedGenerator::new(VALID_JSON);
    let config = gemini_config();

    let ctx = FingerprintContext::new(birth_profile.birth_instant, &history, Utc::now());
    assert!(cache::get(&conn, "u1", AnalysisKind::Next7Days, &ctx).is_none());

    let payload =
        analysis::analyze(&generator, &config, &chart, &history, AnalysisKind::Next7Days).await;
    assert!(!payload.is_error());
    cache::put(&conn, "u1", AnalysisKind::Next7Days, &payload, &ctx).unwrap();

    // Cache hit serves the same payload; the generator is not called again
    let hit = cache::get(&conn, "u1", AnalysisKind::Next7Days, &ctx).unwrap();
    assert_eq!(hit.payload, payload);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn refresh_flow_invalidates_then_recomputes() {
    let conn = seeded_db();
    let birth_profile = profile::get_profile(&conn, "u1").unwrap().unwrap();
    let chart = compute_chart(&birth_profile);
    let history = events::list_events(&conn, "u1").unwrap();
    let generator = ScriptedGenerator::new(VALID_JSON);
    let config = gemini_config();
    let ctx = FingerprintContext::new(birth_profile.birth_instant, &history, Utc::now());

    let first =
        analysis::analyze(&generator, &config, &chart, &history, AnalysisKind::Monthly).await;
    cache::put(&conn, "u1", AnalysisKind::Monthly, &first, &ctx).unwrap();

    // Explicit refresh: invalidate, then a get must miss, forcing analyze
    cache::invalidate(&conn, "u1", AnalysisKind::Monthly).unwrap();
    assert!(cache::get(&conn, "u1", AnalysisKind::Monthly, &ctx).is_none());

    let second =
        analysis::analyze(&generator, &config, &chart, &history, AnalysisKind::Monthly).await;
    cache::put(&conn, "u1", AnalysisKind::Monthly, &second, &ctx).unwrap();
    assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn garbled_model_output_is_cached_as_valid_result() {
    let conn = seeded_db();
    let birth_profile = profile::get_profile(&conn, "u1").unwrap().unwrap();
    let chart = compute_chart(&birth_profile);
    let history = events::list_events(&conn, "u1").unwrap();
    let generator = ScriptedGenerator::new("Sure! Here is your analysis in prose form.");
    let config = gemini_config();
    let ctx = FingerprintContext::new(birth_profile.birth_instant, &history, Utc::now());

    let payload =
        analysis::analyze(&generator, &config, &chart, &history, AnalysisKind::Yearly).await;
    // Fallback, not an error: the success shape survives a garbled response
    match &payload {
        AnalysisPayload::Result(result) => {
            assert!(!result.future_guidance.paragraph1.is_empty());
            assert!(result.key_nodes.is_empty());
        }
        AnalysisPayload::Error { error } => panic!("unexpected error: {error}"),
    }

    cache::put(&conn, "u1", AnalysisKind::Yearly, &payload, &ctx).unwrap();
    let hit = cache::get(&conn, "u1", AnalysisKind::Yearly, &ctx).unwrap();
    assert_eq!(hit.payload, payload);
}

#[tokio::test]
async fn batch_analysis_fills_all_four_horizons() {
    let conn = seeded_db();
    let birth_profile = profile::get_profile(&conn, "u1").unwrap().unwrap();
    let chart = compute_chart(&birth_profile);
    let history = events::list_events(&conn, "u1").unwrap();
    let generator = ScriptedGenerator::new(VALID_JSON);
    let config = gemini_config();
    // One clock for put and get: the batch cannot straddle a bucket rollover
    let now = Utc::now();

    let results =
        analysis::analyze_all(&generator, &config, &conn, "u1", &chart, &history, now).await;
    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|(_, p)| !p.is_error()));

    let ctx = FingerprintContext::new(birth_profile.birth_instant, &history, now);
    for kind in analysis::ALL_KINDS {
        assert!(cache::get(&conn, "u1", kind, &ctx).is_some(), "{kind} missing");
    }
}

#[tokio::test]
async fn partial_cache_hit_recomputes_only_the_misses() {
    let conn = seeded_db();
    let birth_profile = profile::get_profile(&conn, "u1").unwrap().unwrap();
    let chart = compute_chart(&birth_profile);
    let history = events::list_events(&conn, "u1").unwrap();
    let generator = ScriptedGenerator::new(VALID_JSON);
    let config = gemini_config();
    let now = Utc::now();
    let ctx = FingerprintContext::new(birth_profile.birth_instant, &history, now);

    // Yearly is already fresh, with a payload distinct from what the
    // generator would produce
    let stored = AnalysisPayload::Result(
        analysis::parse_analysis(&VALID_JSON.replace("a bright stretch", "an earlier run")).result,
    );
    cache::put(&conn, "u1", AnalysisKind::Yearly, &stored, &ctx).unwrap();

    // Consumer pass: only the three misses reach the pipeline
    let missed: Vec<AnalysisKind> = analysis::ALL_KINDS
        .into_iter()
        .filter(|k| cache::get(&conn, "u1", *k, &ctx).is_none())
        .collect();
    assert_eq!(missed.len(), 3);
    assert!(!missed.contains(&AnalysisKind::Yearly));

    let results = analysis::analyze_kinds(
        &generator, &config, &conn, "u1", &chart, &history, &missed, now,
    )
    .await;
    assert_eq!(results.len(), 3);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 3);

    // The fresh horizon was neither recomputed nor overwritten
    let hit = cache::get(&conn, "u1", AnalysisKind::Yearly, &ctx).unwrap();
    assert_eq!(hit.payload, stored);
}
