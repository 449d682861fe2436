//! Core search pipeline: normalise, transliterate + embed, fan out, assemble.
//!
//! Every stage runs under one request-scoped deadline. When it fires the
//! whole request fails with [`SearchError::DeadlineExceeded`]; no partial
//! list is ever returned.

use std::sync::Arc;
use std::time::Instant;

use crate::backend::{Embedder, LocationStore, SearchBackend, Transliterator};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::normalize::normalize;
use crate::types::{LocationFilter, RankedResult};

use super::assemble::assemble;
use super::fanout::fan_out;

/// Hybrid location search over injected collaborators.
///
/// Cheap to clone; all collaborators are shared behind `Arc`.
#[derive(Clone)]
pub struct LocationSearch {
    config: SearchConfig,
    transliterator: Arc<dyn Transliterator>,
    embedder: Arc<dyn Embedder>,
    backend: Arc<dyn SearchBackend>,
    store: Arc<dyn LocationStore>,
}

impl std::fmt::Debug for LocationSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationSearch")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LocationSearch {
    /// Create a search service after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` is invalid.
    pub fn new(
        config: SearchConfig,
        transliterator: Arc<dyn Transliterator>,
        embedder: Arc<dyn Embedder>,
        backend: Arc<dyn SearchBackend>,
        store: Arc<dyn LocationStore>,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            config,
            transliterator,
            embedder,
            backend,
            store,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search locations matching `query`, returning at most `limit` results.
    ///
    /// A `limit` of 0 means the configured default; limits above the
    /// configured maximum are clamped.
    ///
    /// # Errors
    ///
    /// - [`SearchError::EmptyQuery`] if the query is blank after normalisation
    /// - a stage-specific `*Unavailable` error if a collaborator fails
    /// - [`SearchError::DeadlineExceeded`] if the pipeline outlives the deadline
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<RankedResult>, SearchError> {
        self.search_filtered(query, limit, &LocationFilter::default())
            .await
    }

    /// Like [`search`](Self::search), restricting canonical records to `filter`.
    ///
    /// # Errors
    ///
    /// Same as [`search`](Self::search).
    pub async fn search_filtered(
        &self,
        query: &str,
        limit: usize,
        filter: &LocationFilter,
    ) -> Result<Vec<RankedResult>, SearchError> {
        let deadline = self.config.deadline();
        let started = Instant::now();

        let results = tokio::time::timeout(deadline, self.run(query, limit, filter))
            .await
            .map_err(|_| {
                tracing::warn!(deadline_ms = self.config.deadline_ms, "search deadline exceeded");
                SearchError::DeadlineExceeded(format!("exceeded {}ms", self.config.deadline_ms))
            })??;

        tracing::debug!(
            results = results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search completed"
        );
        Ok(results)
    }

    async fn run(
        &self,
        query: &str,
        limit: usize,
        filter: &LocationFilter,
    ) -> Result<Vec<RankedResult>, SearchError> {
        let normalized = normalize(query)?;
        let limit = self.config.effective_limit(limit);
        tracing::trace!(raw = query, %normalized, "normalized query");

        let (transliterated, embedding) = tokio::try_join!(
            self.transliterator.transliterate(&normalized),
            self.embedder.embed(&normalized),
        )?;
        tracing::trace!(%transliterated, dims = embedding.len(), "collaborators answered");

        let fused = fan_out(
            self.backend.as_ref(),
            &normalized,
            &transliterated,
            &embedding,
            self.config.per_sub_query_limit,
        )
        .await?;

        assemble(
            self.store.as_ref(),
            &fused,
            filter,
            &self.config.fusion,
            limit,
        )
        .await
    }
}
