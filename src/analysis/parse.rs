//! Response normalization — from raw model text to a structurally valid
//! [`AnalysisResult`].
//!
//! Parse and validation failures do not escalate: they produce a placeholder
//! fallback with every section present, so the consumer's rendering path
//! never branches on a second error shape. The [`ParsedAnalysis::fallback`]
//! flag records that the result is degraded.

use tracing::warn;

use crate::analysis::types::{AnalysisResult, Guidance, Section};

/// Parse outcome: the result plus whether it is the degraded placeholder.
#[derive(Debug, Clone)]
pub struct ParsedAnalysis {
    pub result: AnalysisResult,
    pub fallback: bool,
}

/// Strip a markdown code fence if the model wrapped its JSON in one.
fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        trimmed
            .replace("```json", "")
            .replace("```", "")
            .trim()
            .to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parse raw model output into an [`AnalysisResult`].
///
/// Serde enforces the required-field contract: `futureGuidance`, `career`,
/// `emotion`, `energy`, and `keyNodes` must all be present
/// (`spiritualityIndex` defaults). Invalid JSON or missing fields yield the
/// placeholder fallback instead of an error.
pub fn parse_analysis(raw: &str) -> ParsedAnalysis {
    let cleaned = strip_code_fence(raw);
    match serde_json::from_str::<AnalysisResult>(&cleaned) {
        Ok(result) => ParsedAnalysis {
            result,
            fallback: false,
        },
        Err(err) => {
            warn!(error = %err, "model output failed to parse, using fallback result");
            ParsedAnalysis {
                result: fallback_result(),
                fallback: true,
            }
        }
    }
}

/// Placeholder result used when the model's output cannot be parsed.
pub fn fallback_result() -> AnalysisResult {
    AnalysisResult {
        future_guidance: Guidance {
            paragraph1: "The analysis could not be parsed. Please try again later.".into(),
            paragraph2: String::new(),
        },
        spirituality_index: 50,
        career: Section {
            title: "Career".into(),
            content: "The analysis could not be parsed.".into(),
        },
        emotion: Section {
            title: "Emotion".into(),
            content: "The analysis could not be parsed.".into(),
        },
        energy: Section {
            title: "Energy".into(),
            content: "The analysis could not be parsed.".into(),
        },
        key_nodes: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_JSON: &str = r#"{
        "futureGuidance": {"paragraph1": "p1", "paragraph2": "p2"},
        "spiritualityIndex": 82,
        "career": {"title": "Career", "content": "steady"},
        "emotion": {"title": "Emotion", "content": "warm"},
        "energy": {"title": "Energy", "content": "high"},
        "keyNodes": [{"date": "2026-09-01", "description": "shift"}]
    }"#;

    #[test]
    fn parses_raw_json() {
        let parsed = parse_analysis(VALID_JSON);
        assert!(!parsed.fallback);
        assert_eq!(parsed.result.spirituality_index, 82);
        assert_eq!(parsed.result.key_nodes.len(), 1);
    }

    #[test]
    fn parses_fenced_json() {
        let fenced = format!("```json\n{VALID_JSON}\n```");
        let parsed = parse_analysis(&fenced);
        assert!(!parsed.fallback);
        assert_eq!(parsed.result.career.content, "steady");
    }

    #[test]
    fn parses_bare_fence() {
        let fenced = format!("```\n{VALID_JSON}\n```");
        let parsed = parse_analysis(&fenced);
        assert!(!parsed.fallback);
    }

    #[test]
    fn malformed_json_yields_complete_fallback() {
        let parsed = parse_analysis("I am sorry, here is your analysis: ...");
        assert!(parsed.fallback);
        let r = &parsed.result;
        assert!(!r.future_guidance.paragraph1.is_empty());
        assert_eq!(r.spirituality_index, 50);
        assert!(!r.career.content.is_empty());
        assert!(!r.emotion.content.is_empty());
        assert!(!r.energy.content.is_empty());
        assert!(r.key_nodes.is_empty());
    }

    #[test]
    fn missing_required_field_yields_fallback() {
        // No keyNodes
        let incomplete = r#"{
            "futureGuidance": {"paragraph1": "p1", "paragraph2": "p2"},
            "career": {"title": "Career", "content": "c"},
            "emotion": {"title": "Emotion", "content": "e"},
            "energy": {"title": "Energy", "content": "n"}
        }"#;
        let parsed = parse_analysis(incomplete);
        assert!(parsed.fallback);
    }

    #[test]
    fn empty_text_yields_fallback() {
        assert!(parse_analysis("").fallback);
        assert!(parse_analysis("   ").fallback);
    }
}
