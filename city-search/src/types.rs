//! Core types for hits, fused candidates, and ranked locations.

use serde::{Deserialize, Serialize};

/// Dense query embedding produced by the embedding collaborator.
pub type Embedding = Vec<f32>;

/// A single candidate returned by one sub-query of the search engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Location identifier.
    pub id: i64,
    /// Vector distance to the query embedding (lower is better).
    pub vector_distance: Option<f32>,
    /// Lexical match score (higher is better).
    pub text_match: Option<i64>,
    /// Rank-fusion score computed by the search engine itself, if any.
    pub rank_fusion_score: Option<f64>,
}

impl SearchHit {
    /// A hit carrying only a vector distance.
    pub fn vector(id: i64, distance: f32) -> Self {
        Self {
            id,
            vector_distance: Some(distance),
            text_match: None,
            rank_fusion_score: None,
        }
    }

    /// A hit carrying only a text-match score.
    pub fn text(id: i64, score: i64) -> Self {
        Self {
            id,
            vector_distance: None,
            text_match: Some(score),
            rank_fusion_score: None,
        }
    }
}

/// One request in a multi-search batch.
#[derive(Debug, Clone, PartialEq)]
pub struct SubQuery {
    /// Query text (normalised or transliterated).
    pub text: String,
    /// Query embedding, shared by every sub-query of a request.
    pub vector: Embedding,
    /// Maximum number of hits requested.
    pub limit: usize,
}

/// Why a single batch element produced no usable hits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubQueryFailure {
    /// Status code reported by the engine for this element, if any.
    pub code: Option<u16>,
    /// Human-readable reason.
    pub message: String,
}

impl SubQueryFailure {
    pub fn new(code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SubQueryFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "code {code}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Result of one batch element, order-aligned with the request batch.
pub type SubQueryOutcome = std::result::Result<Vec<SearchHit>, SubQueryFailure>;

/// Best evidence for one location across every sub-query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusedCandidate {
    pub id: i64,
    /// Minimum vector distance seen.
    pub vector_distance: Option<f32>,
    /// Maximum text-match score seen.
    pub text_match: Option<i64>,
    /// Maximum engine-side rank-fusion score seen.
    pub rank_fusion_score: Option<f64>,
}

impl FusedCandidate {
    /// Returns `true` if at least one ranking signal is present.
    pub fn has_evidence(&self) -> bool {
        self.vector_distance.is_some() || self.text_match.is_some()
    }
}

impl From<&SearchHit> for FusedCandidate {
    fn from(hit: &SearchHit) -> Self {
        Self {
            id: hit.id,
            vector_distance: hit.vector_distance,
            text_match: hit.text_match,
            rank_fusion_score: hit.rank_fusion_score,
        }
    }
}

/// Canonical location record owned by the location store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub city: String,
    pub state: String,
    pub country: String,
    /// Country code.
    pub code: String,
    pub lat: f64,
    pub lng: f64,
}

/// Typed filter criteria for the location store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationFilter {
    /// Restrict results to this country (exact match).
    pub country: Option<String>,
}

impl LocationFilter {
    /// Filter restricted to a single country.
    pub fn country(country: impl Into<String>) -> Self {
        Self {
            country: Some(country.into()),
        }
    }
}

/// A location enriched with its ranking signals and final position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub location: Location,
    pub vector_distance: Option<f32>,
    pub text_match: Option<i64>,
    /// Combined score; `None` when the location carried no ranking signal.
    pub fusion_score: Option<f64>,
    /// 0-based position in the final ordering.
    pub position: usize,
}
