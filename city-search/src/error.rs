//! Error types for the city-search crate.
//!
//! Every variant names the pipeline stage that failed so callers can map
//! it to a transport-level response without inspecting the message.

/// Errors that can occur while answering a location search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The query was blank after normalisation.
    #[error("empty search query")]
    EmptyQuery,

    /// The transliteration collaborator failed.
    #[error("transliteration unavailable: {0}")]
    TransliterationUnavailable(String),

    /// The embedding collaborator failed.
    #[error("embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// Every sub-query against the search engine failed.
    #[error("search engine unavailable: {0}")]
    SearchEngineUnavailable(String),

    /// The canonical location lookup failed.
    #[error("location store unavailable: {0}")]
    LocationStoreUnavailable(String),

    /// The request-scoped deadline fired before the pipeline finished.
    #[error("deadline exceeded: {0}")]
    DeadlineExceeded(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl SearchError {
    /// Returns `true` for errors caused by the caller rather than a collaborator.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::EmptyQuery)
    }
}

/// Convenience type alias for city-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
