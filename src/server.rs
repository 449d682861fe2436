//! HTTP API for location search.
//!
//! ## Endpoints
//!
//! - `GET /api/v1/search?query=..&limit=..&country=..`: ranked locations
//! - `GET /health`: liveness probe

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

use city_search::{LocationFilter, LocationSearch, RankedResult, SearchError};

use crate::config::ServerConfig;
use crate::error::ServiceError;

/// Shortest accepted query, in characters.
const MIN_QUERY_CHARS: usize = 3;

/// Longest accepted query, in characters.
const MAX_QUERY_CHARS: usize = 100;

/// Largest accepted `limit` parameter.
const MAX_LIMIT: usize = 100;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Raw query-string parameters. Parsed by hand so malformed values still
/// produce a JSON error body.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// A location in the search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDto {
    pub id: i64,
    pub city: String,
    pub state: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub vector_distance: Option<f32>,
    pub text_match_score: Option<i64>,
    pub rank_fusion_score: Option<f64>,
}

impl From<RankedResult> for LocationDto {
    fn from(result: RankedResult) -> Self {
        let location = result.location;
        Self {
            id: location.id,
            city: location.city,
            state: location.state,
            country: location.country,
            latitude: location.lat,
            longitude: location.lng,
            vector_distance: result.vector_distance,
            text_match_score: result.text_match,
            rank_fusion_score: result.fusion_score,
        }
    }
}

/// Body of a successful search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub limit: usize,
    pub locations: Vec<LocationDto>,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

/// An error ready to be rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                code: code.to_owned(),
                message: message.into(),
            },
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        let message = err.to_string();
        match err {
            SearchError::EmptyQuery => {
                Self::new(StatusCode::BAD_REQUEST, "EMPTY_SEARCH_QUERY", message)
            }
            SearchError::TransliterationUnavailable(_)
            | SearchError::EmbeddingUnavailable(_)
            | SearchError::SearchEngineUnavailable(_)
            | SearchError::LocationStoreUnavailable(_) => {
                Self::new(StatusCode::BAD_GATEWAY, "UPSTREAM_UNAVAILABLE", message)
            }
            SearchError::DeadlineExceeded(_) => {
                Self::new(StatusCode::GATEWAY_TIMEOUT, "DEADLINE_EXCEEDED", message)
            }
            SearchError::Config(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A validated search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSearch {
    pub query: String,
    /// `None` when the caller did not pass a limit.
    pub limit: Option<usize>,
    pub filter: LocationFilter,
}

/// Validate raw query-string parameters.
///
/// # Errors
///
/// Returns a `400` [`ApiError`] describing the first invalid parameter.
pub fn validate(params: SearchParams) -> Result<ValidatedSearch, ApiError> {
    let query = params.query.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "EMPTY_SEARCH_QUERY",
            "query is required",
        ));
    }
    let chars = query.chars().count();
    if !(MIN_QUERY_CHARS..=MAX_QUERY_CHARS).contains(&chars) {
        return Err(ApiError::bad_request(format!(
            "query must be between {MIN_QUERY_CHARS} and {MAX_QUERY_CHARS} characters"
        )));
    }

    let limit = match params.limit.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => {
            let limit: usize = raw
                .parse()
                .map_err(|_| ApiError::bad_request(format!("limit must be a number: {raw}")))?;
            if !(1..=MAX_LIMIT).contains(&limit) {
                return Err(ApiError::bad_request(format!(
                    "limit must be between 1 and {MAX_LIMIT}"
                )));
            }
            Some(limit)
        }
    };

    let filter = LocationFilter {
        country: params
            .country
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty()),
    };

    Ok(ValidatedSearch {
        query,
        limit,
        filter,
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct AppState {
    search: LocationSearch,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let request = validate(params)?;
    let limit = state
        .search
        .config()
        .effective_limit(request.limit.unwrap_or(0));

    let results = state
        .search
        .search_filtered(&request.query, limit, &request.filter)
        .await
        .map_err(|e| {
            if !e.is_caller_error() {
                tracing::error!(error = %e, "search failed");
            }
            ApiError::from(e)
        })?;

    Ok(Json(SearchResponse {
        query: request.query,
        limit,
        locations: results.into_iter().map(LocationDto::from).collect(),
    }))
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Build the API router over `search`.
pub fn router(search: LocationSearch) -> Router {
    Router::new()
        .route("/api/v1/search", get(handle_search))
        .route("/health", get(handle_health))
        .with_state(AppState { search })
}

// ---------------------------------------------------------------------------
// SearchServer
// ---------------------------------------------------------------------------

/// Background HTTP server for the search API.
pub struct SearchServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl SearchServer {
    /// Start serving on `{config.host}:{config.port}` (port `0` auto-assigns).
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Server`] if the listener cannot bind.
    pub async fn start(search: LocationSearch, config: &ServerConfig) -> Result<Self, ServiceError> {
        let app = router(search);

        let bind_addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| ServiceError::Server(format!("bind {bind_addr} failed: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| ServiceError::Server(format!("failed to get local addr: {e}")))?;

        info!("search API listening on http://{addr}");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("search server error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Abort the server task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for SearchServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
