//! Hit deduplication by location id.
//!
//! Hits from every sub-query are folded into one [`FusedCandidate`] per
//! location. Each signal keeps its best value independently: the smallest
//! vector distance and the largest text-match score. The fold is
//! commutative, so the order in which sub-queries complete never changes
//! the resulting map.

use std::collections::HashMap;

use crate::types::{FusedCandidate, SearchHit};

/// The deduplicated candidate set of one search request.
#[derive(Debug, Clone, Default)]
pub struct FusedSet {
    /// Candidate ids in first-seen order. Callers must not rely on it.
    ids: Vec<i64>,
    candidates: HashMap<i64, FusedCandidate>,
}

impl FusedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a single hit into the set.
    pub fn insert(&mut self, hit: &SearchHit) {
        let incoming = sanitize(FusedCandidate::from(hit));
        match self.candidates.get_mut(&hit.id) {
            Some(existing) => merge_candidate(existing, &incoming),
            None => {
                self.ids.push(hit.id);
                self.candidates.insert(hit.id, incoming);
            }
        }
    }

    /// Fold every hit of one sub-query into the set.
    pub fn extend<'a, I>(&mut self, hits: I)
    where
        I: IntoIterator<Item = &'a SearchHit>,
    {
        for hit in hits {
            self.insert(hit);
        }
    }

    /// Candidate ids (set semantics).
    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    pub fn get(&self, id: i64) -> Option<&FusedCandidate> {
        self.candidates.get(&id)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Consume the set, returning the `id -> candidate` map.
    pub fn into_map(self) -> HashMap<i64, FusedCandidate> {
        self.candidates
    }
}

/// Merge `other` into `into`, keeping the best value of each signal.
///
/// The vector distance keeps the minimum, the text-match score and the
/// engine's rank-fusion score keep the maximum. An absent value never
/// replaces a present one.
pub fn merge_candidate(into: &mut FusedCandidate, other: &FusedCandidate) {
    into.vector_distance = best_by(into.vector_distance, other.vector_distance, |a, b| b < a);
    into.text_match = best_by(into.text_match, other.text_match, |a, b| b > a);
    into.rank_fusion_score = best_by(into.rank_fusion_score, other.rank_fusion_score, |a, b| b > a);
}

/// Pick between two optional values; `better(a, b)` returns `true` when
/// `b` should replace `a`.
fn best_by<T: Copy>(current: Option<T>, incoming: Option<T>, better: impl Fn(T, T) -> bool) -> Option<T> {
    match (current, incoming) {
        (Some(a), Some(b)) if better(a, b) => Some(b),
        (Some(a), _) => Some(a),
        (None, b) => b,
    }
}

/// NaN scores are treated as absent so the merge stays order-independent.
fn sanitize(mut candidate: FusedCandidate) -> FusedCandidate {
    candidate.vector_distance = candidate.vector_distance.filter(|d| !d.is_nan());
    if let Some(d) = candidate.vector_distance.filter(|d| !(0.0..=1.0).contains(d)) {
        tracing::warn!(id = candidate.id, distance = d, "vector distance outside [0, 1]");
    }
    candidate.rank_fusion_score = candidate.rank_fusion_score.filter(|s| !s.is_nan());
    candidate
}
