//! Error types for the whereismycity service.

/// Top-level error type for wiring and serving the location search.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// HTTP client construction error.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Location store error.
    #[error("store error: {0}")]
    Store(String),

    /// HTTP server error (bind, serve).
    #[error("server error: {0}")]
    Server(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Search pipeline error.
    #[error(transparent)]
    Search(#[from] city_search::SearchError),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ServiceError>;
