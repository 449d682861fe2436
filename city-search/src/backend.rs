//! Collaborator traits consumed by the search pipeline.
//!
//! The pipeline never talks to a network or a database directly. Each
//! external service is injected as an `Arc<dyn Trait>` when a
//! [`LocationSearch`](crate::LocationSearch) is constructed.
//!
//! All implementations must be `Send + Sync`; the pipeline awaits
//! collaborators concurrently.

use async_trait::async_trait;

use crate::error::SearchError;
use crate::types::{Embedding, Location, LocationFilter, SearchHit, SubQuery, SubQueryOutcome};

/// Renders a query in an alternate script or spelling.
#[async_trait]
pub trait Transliterator: Send + Sync {
    /// # Errors
    ///
    /// Implementations return [`SearchError::TransliterationUnavailable`].
    async fn transliterate(&self, text: &str) -> Result<String, SearchError>;
}

/// Converts text into a dense vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// # Errors
    ///
    /// Implementations return [`SearchError::EmbeddingUnavailable`].
    async fn embed(&self, text: &str) -> Result<Embedding, SearchError>;
}

/// Hybrid (vector + keyword) search engine.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run every request in one round trip.
    ///
    /// The returned outcomes are order-aligned with `requests`; a failed
    /// element is reported as `Err` in its slot rather than failing the call.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::SearchEngineUnavailable`] when the call as a
    /// whole fails (transport error, malformed response).
    async fn multi_search(
        &self,
        requests: &[SubQuery],
    ) -> Result<Vec<SubQueryOutcome>, SearchError>;

    /// Whether [`multi_search`](Self::multi_search) is a true batched call.
    ///
    /// When `false`, the pipeline issues each sub-query through
    /// [`search`](Self::search) concurrently instead.
    fn supports_batching(&self) -> bool {
        true
    }

    /// Run a single request.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::SearchEngineUnavailable`] if the request fails.
    async fn search(&self, request: &SubQuery) -> Result<Vec<SearchHit>, SearchError> {
        let outcome = self
            .multi_search(std::slice::from_ref(request))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                SearchError::SearchEngineUnavailable("search returned no result sets".into())
            })?;
        outcome.map_err(|failure| SearchError::SearchEngineUnavailable(failure.to_string()))
    }
}

/// Read-only access to canonical location records.
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Fetch up to `limit` locations whose id is in `ids` and which match
    /// `filter`. Ordering is store-defined.
    ///
    /// # Errors
    ///
    /// Implementations return [`SearchError::LocationStoreUnavailable`].
    async fn find_by_ids(
        &self,
        ids: &[i64],
        filter: &LocationFilter,
        limit: usize,
    ) -> Result<Vec<Location>, SearchError>;
}
