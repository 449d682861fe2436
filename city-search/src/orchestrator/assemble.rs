//! Result assembly: join fused candidates with canonical records and rank.

use std::cmp::Ordering;

use crate::backend::LocationStore;
use crate::config::FusionWeights;
use crate::error::SearchError;
use crate::types::{Location, LocationFilter, RankedResult};

use super::dedup::FusedSet;
use super::fusion::fuse;

/// Fetch the candidate locations, score them, and order them.
///
/// The whole candidate set is fetched in one `find_by_ids` call so that
/// fusion ranking, not the store's own ordering, decides which locations
/// survive the final truncation to `limit`.
///
/// # Errors
///
/// Propagates the store's [`SearchError::LocationStoreUnavailable`].
pub async fn assemble(
    store: &dyn LocationStore,
    fused: &FusedSet,
    filter: &LocationFilter,
    weights: &FusionWeights,
    limit: usize,
) -> Result<Vec<RankedResult>, SearchError> {
    if fused.is_empty() {
        return Ok(Vec::new());
    }

    let locations = store.find_by_ids(fused.ids(), filter, fused.len()).await?;
    tracing::debug!(
        candidates = fused.len(),
        fetched = locations.len(),
        "fetched candidate locations"
    );

    let mut ranked = rank(locations, fused, weights);
    ranked.truncate(limit);
    for (position, result) in ranked.iter_mut().enumerate() {
        result.position = position;
    }
    Ok(ranked)
}

/// Attach signals and fusion scores to `locations` and sort them.
///
/// The sort is stable: equal scores keep the store's order. Locations
/// without any ranking signal get no fusion score and sort after every
/// scored location.
pub fn rank(locations: Vec<Location>, fused: &FusedSet, weights: &FusionWeights) -> Vec<RankedResult> {
    let mut ranked: Vec<RankedResult> = locations
        .into_iter()
        .map(|location| {
            let candidate = fused.get(location.id).copied();
            let fusion_score = candidate
                .filter(|c| c.has_evidence())
                .map(|c| fuse(&c, weights));
            RankedResult {
                vector_distance: candidate.and_then(|c| c.vector_distance),
                text_match: candidate.and_then(|c| c.text_match),
                fusion_score,
                position: 0,
                location,
            }
        })
        .collect();

    ranked.sort_by(|a, b| compare_scores(a.fusion_score, b.fusion_score));
    ranked
}

/// Descending order with `None` last.
fn compare_scores(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
