//! Dual-query fan-out against the search engine.
//!
//! Both sub-queries share the same embedding; one carries the normalised
//! text, the other the transliterated text. Backends that support batching
//! receive both in a single `multi_search` call; otherwise the sub-queries
//! are issued concurrently with [`futures::future::join_all`].

use crate::backend::SearchBackend;
use crate::error::SearchError;
use crate::types::{Embedding, SubQuery, SubQueryFailure, SubQueryOutcome};

use super::dedup::FusedSet;

/// Fan out the normalised and transliterated query and merge the hits.
///
/// # Pipeline
///
/// 1. Build two [`SubQuery`] values sharing `embedding`
/// 2. Issue them as one batch, or concurrently when batching is unsupported
/// 3. Log failed or empty elements at warn level and skip them
/// 4. Fold all surviving hits into a [`FusedSet`]
///
/// # Errors
///
/// Returns [`SearchError::SearchEngineUnavailable`] if the batched call
/// fails outright or if **every** sub-query fails. Partial failures are
/// logged but do not prevent hits from the successful sub-query being used.
pub async fn fan_out(
    backend: &dyn SearchBackend,
    normalized: &str,
    transliterated: &str,
    embedding: &Embedding,
    per_sub_query_limit: usize,
) -> Result<FusedSet, SearchError> {
    let requests = [normalized, transliterated].map(|text| SubQuery {
        text: text.to_owned(),
        vector: embedding.clone(),
        limit: per_sub_query_limit,
    });

    let outcomes = dispatch(backend, &requests).await?;
    merge_outcomes(outcomes, requests.len())
}

/// Send the sub-queries, batched when the backend supports it.
async fn dispatch(
    backend: &dyn SearchBackend,
    requests: &[SubQuery],
) -> Result<Vec<SubQueryOutcome>, SearchError> {
    if backend.supports_batching() {
        return backend.multi_search(requests).await;
    }

    let futures = requests.iter().map(|request| async move {
        backend
            .search(request)
            .await
            .map_err(|err| SubQueryFailure::new(None, err.to_string()))
    });
    Ok(futures::future::join_all(futures).await)
}

/// Fold the outcomes of every sub-query into one candidate set.
///
/// `expected` is the number of sub-queries sent; missing outcomes (a batch
/// response shorter than the request) count as failures.
pub fn merge_outcomes(
    outcomes: Vec<SubQueryOutcome>,
    expected: usize,
) -> Result<FusedSet, SearchError> {
    let mut fused = FusedSet::new();
    let mut errors: Vec<String> = Vec::new();

    let mut outcomes = outcomes.into_iter();
    for index in 0..expected {
        let outcome = outcomes
            .next()
            .unwrap_or_else(|| Err(SubQueryFailure::new(None, "missing from batch response")));

        match outcome {
            Ok(hits) if hits.is_empty() => {
                tracing::warn!(sub_query = index, "sub-query returned no hits");
                errors.push(format!("sub-query {index}: no hits"));
            }
            Ok(hits) => {
                tracing::debug!(sub_query = index, count = hits.len(), "sub-query returned hits");
                fused.extend(&hits);
            }
            Err(failure) => {
                tracing::warn!(sub_query = index, error = %failure, "sub-query failed");
                errors.push(format!("sub-query {index}: {failure}"));
            }
        }
    }

    if errors.len() == expected {
        return Err(SearchError::SearchEngineUnavailable(errors.join("; ")));
    }

    tracing::debug!(candidates = fused.len(), "merged sub-query hits");
    Ok(fused)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SearchHit;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Backend returning canned outcomes and recording what it was asked.
    struct ScriptedBackend {
        batching: bool,
        outcomes: Vec<SubQueryOutcome>,
        seen: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedBackend {
        fn new(batching: bool, outcomes: Vec<SubQueryOutcome>) -> Self {
            Self {
                batching,
                outcomes,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.seen.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl SearchBackend for ScriptedBackend {
        async fn multi_search(
            &self,
            requests: &[SubQuery],
        ) -> Result<Vec<SubQueryOutcome>, SearchError> {
            self.seen
                .lock()
                .expect("lock")
                .push(requests.iter().map(|r| r.text.clone()).collect());
            Ok(self.outcomes.clone())
        }

        fn supports_batching(&self) -> bool {
            self.batching
        }

        async fn search(&self, request: &SubQuery) -> Result<Vec<SearchHit>, SearchError> {
            self.seen.lock().expect("lock").push(vec![request.text.clone()]);
            let index = usize::from(request.text == "New York");
            match &self.outcomes[index] {
                Ok(hits) => Ok(hits.clone()),
                Err(failure) => Err(SearchError::SearchEngineUnavailable(failure.to_string())),
            }
        }
    }

    fn scenario_outcomes() -> Vec<SubQueryOutcome> {
        vec![
            Ok(vec![SearchHit::text(42, 1_000)]),
            Ok(vec![SearchHit::vector(42, 0.1), SearchHit::vector(7, 0.5)]),
        ]
    }

    #[tokio::test]
    async fn batched_backend_gets_one_call_with_both_texts() {
        let backend = ScriptedBackend::new(true, scenario_outcomes());
        let fused = fan_out(&backend, "Nw, Yrk", "New York", &vec![0.5; 4], 50)
            .await
            .expect("fan out");

        assert_eq!(backend.calls(), vec![vec!["Nw, Yrk".to_string(), "New York".to_string()]]);
        assert_eq!(fused.len(), 2);
        let c42 = fused.get(42).expect("42");
        assert_eq!(c42.vector_distance, Some(0.1));
        assert_eq!(c42.text_match, Some(1_000));
        let c7 = fused.get(7).expect("7");
        assert_eq!(c7.vector_distance, Some(0.5));
        assert!(c7.text_match.is_none());
    }

    #[tokio::test]
    async fn unbatched_backend_gets_one_call_per_sub_query() {
        let backend = ScriptedBackend::new(false, scenario_outcomes());
        let fused = fan_out(&backend, "Nw, Yrk", "New York", &vec![0.5; 4], 50)
            .await
            .expect("fan out");

        let mut calls = backend.calls();
        calls.sort();
        assert_eq!(calls, vec![vec!["New York".to_string()], vec!["Nw, Yrk".to_string()]]);
        assert_eq!(fused.len(), 2);
        assert_eq!(fused.get(42).and_then(|c| c.text_match), Some(1_000));
    }

    #[tokio::test]
    async fn sub_queries_share_embedding_and_limit() {
        struct Capture(Mutex<Vec<SubQuery>>);

        #[async_trait]
        impl SearchBackend for Capture {
            async fn multi_search(
                &self,
                requests: &[SubQuery],
            ) -> Result<Vec<SubQueryOutcome>, SearchError> {
                self.0.lock().expect("lock").extend_from_slice(requests);
                Ok(vec![Ok(vec![SearchHit::text(1, 5)]), Ok(vec![])])
            }
        }

        let backend = Capture(Mutex::new(Vec::new()));
        fan_out(&backend, "a", "b", &vec![0.25, 0.75], 50)
            .await
            .expect("fan out");

        let captured = backend.0.lock().expect("lock").clone();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0].vector, captured[1].vector);
        assert!(captured.iter().all(|r| r.limit == 50));
    }

    #[test]
    fn partial_failure_keeps_successful_hits() {
        let fused = merge_outcomes(
            vec![
                Ok(vec![SearchHit::text(42, 1_000)]),
                Err(SubQueryFailure::new(Some(503), "unavailable")),
            ],
            2,
        )
        .expect("partial failure tolerated");
        assert_eq!(fused.ids(), &[42]);
    }

    #[test]
    fn empty_element_counts_as_failure() {
        let err = merge_outcomes(vec![Ok(vec![]), Ok(vec![])], 2).unwrap_err();
        assert!(matches!(err, SearchError::SearchEngineUnavailable(_)));
        assert!(err.to_string().contains("no hits"));
    }

    #[test]
    fn total_failure_reports_every_sub_query() {
        let err = merge_outcomes(
            vec![
                Err(SubQueryFailure::new(Some(500), "a")),
                Err(SubQueryFailure::new(Some(404), "b")),
            ],
            2,
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("sub-query 0: code 500: a"));
        assert!(message.contains("sub-query 1: code 404: b"));
    }

    #[test]
    fn short_batch_response_counts_missing_as_failed() {
        let fused = merge_outcomes(vec![Ok(vec![SearchHit::vector(1, 0.2)])], 2)
            .expect("one success is enough");
        assert_eq!(fused.len(), 1);

        let err = merge_outcomes(vec![], 2).unwrap_err();
        assert!(err.to_string().contains("missing from batch response"));
    }

    #[test]
    fn outcome_order_does_not_change_merged_candidates() {
        let a = Ok(vec![SearchHit::text(42, 1_000), SearchHit::vector(9, 0.9)]);
        let b = Ok(vec![SearchHit::vector(42, 0.1), SearchHit::vector(9, 0.3)]);
        let forward = merge_outcomes(vec![a.clone(), b.clone()], 2).expect("forward");
        let backward = merge_outcomes(vec![b, a], 2).expect("backward");
        assert_eq!(forward.into_map(), backward.into_map());
    }
}
