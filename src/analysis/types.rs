//! Analysis type definitions.
//!
//! Defines [`AnalysisKind`] (the four time horizons), the [`AnalysisResult`]
//! wire contract returned by the generative endpoint, and
//! [`AnalysisPayload`] — the cache-compatible union of a result and an
//! error-shaped failure.

use serde::{Deserialize, Serialize};

/// The four analysis horizons. Each has its own prompt framing and its own
/// cache time bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    /// Retrospective — recomputed monthly.
    Past,
    /// Forward-looking week — recomputed daily.
    Next7Days,
    /// Current month — recomputed monthly.
    Monthly,
    /// Current year — recomputed yearly.
    Yearly,
}

/// All horizons, in the order batch analysis runs them.
pub const ALL_KINDS: [AnalysisKind; 4] = [
    AnalysisKind::Past,
    AnalysisKind::Next7Days,
    AnalysisKind::Monthly,
    AnalysisKind::Yearly,
];

impl AnalysisKind {
    /// SQL-compatible string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Past => "past",
            Self::Next7Days => "next7days",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "past" => Ok(Self::Past),
            "next7days" => Ok(Self::Next7Days),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!("unknown analysis kind: {s}")),
        }
    }
}

/// The two narrative paragraphs heading an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guidance {
    pub paragraph1: String,
    pub paragraph2: String,
}

/// A titled analysis section (career, emotion, energy).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub content: String,
}

/// A dated key moment within the analysis horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyNode {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub description: String,
}

/// The structured analysis contract. Field names on the wire are camelCase,
/// matching what the endpoint is instructed to emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub future_guidance: Guidance,
    /// `0..=100`; defaults to 50 when the model omits it.
    #[serde(default = "default_spirituality_index")]
    pub spirituality_index: i64,
    pub career: Section,
    pub emotion: Section,
    pub energy: Section,
    pub key_nodes: Vec<KeyNode>,
}

fn default_spirituality_index() -> i64 {
    50
}

/// What the pipeline hands back and what the cache stores: either a full
/// result or an error-shaped object. `analyze` never raises across this
/// boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisPayload {
    Result(AnalysisResult),
    Error { error: String },
}

impl AnalysisPayload {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}
