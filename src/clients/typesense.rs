//! Typesense hybrid search client.
//!
//! Every sub-query of a request goes out in a single
//! `POST {url}/multi_search` call. A result set that reports a non-200
//! `code` or an `error` becomes a failed outcome for its slot; the call
//! itself only fails on transport or decoding errors.

use async_trait::async_trait;
use serde::Deserialize;

use city_search::{SearchBackend, SearchError, SearchHit, SubQuery, SubQueryFailure, SubQueryOutcome};

use super::http::{build_client, endpoint, error_message};
use crate::config::TypesenseConfig;
use crate::error::ServiceError;

const API_KEY_HEADER: &str = "X-TYPESENSE-API-KEY";

// ── Wire types ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct MultiSearchResponse {
    #[serde(default)]
    results: Vec<ResultSet>,
}

#[derive(Debug, Deserialize)]
struct ResultSet {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    hits: Option<Vec<Hit>>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(default)]
    document: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    vector_distance: Option<f32>,
    #[serde(default)]
    text_match: Option<i64>,
    #[serde(default)]
    hybrid_search_info: Option<HybridSearchInfo>,
}

#[derive(Debug, Deserialize)]
struct HybridSearchInfo {
    #[serde(default)]
    rank_fusion_score: Option<f64>,
}

// ── Client ────────────────────────────────────────────────────

/// [`SearchBackend`] backed by a Typesense collection with an
/// `embeddings` vector field.
#[derive(Clone)]
pub struct TypesenseBackend {
    url: String,
    api_key: String,
    config: TypesenseConfig,
    client: reqwest::Client,
}

impl std::fmt::Debug for TypesenseBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypesenseBackend")
            .field("url", &self.url)
            .field("collection", &self.config.collection)
            .finish_non_exhaustive()
    }
}

impl TypesenseBackend {
    /// # Errors
    ///
    /// Returns [`ServiceError::HttpClient`] if the HTTP client cannot be built.
    pub fn new(config: &TypesenseConfig) -> Result<Self, ServiceError> {
        Ok(Self {
            url: endpoint(&config.url, "/multi_search"),
            api_key: config.api_key.clone(),
            config: config.clone(),
            client: build_client(config.timeout_seconds)?,
        })
    }

    /// Build the `multi_search` body for `requests`.
    pub fn build_request(&self, requests: &[SubQuery]) -> serde_json::Value {
        let searches: Vec<serde_json::Value> = requests
            .iter()
            .map(|request| {
                serde_json::json!({
                    "collection": self.config.collection,
                    "q": request.text,
                    "query_by": self.config.query_by,
                    "query_by_weights": self.config.query_by_weights,
                    "exclude_fields": "embeddings",
                    "per_page": request.limit,
                    "prefix": "true",
                    "typo_tokens_threshold": 1,
                    "drop_tokens_threshold": 1,
                    "rerank_hybrid_matches": true,
                    "sort_by": "_vector_distance:asc, _text_match:desc",
                    "vector_query": vector_query(
                        &request.vector,
                        self.config.vector_alpha,
                        self.config.vector_k,
                    ),
                })
            })
            .collect();
        serde_json::json!({ "searches": searches })
    }
}

/// Render the `vector_query` parameter for the `embeddings` field.
fn vector_query(vector: &[f32], alpha: f64, k: usize) -> String {
    let values: Vec<String> = vector.iter().map(f32::to_string).collect();
    format!("embeddings:([{}], alpha: {alpha}, k: {k})", values.join(","))
}

/// Read `location_id`, accepting either an integer or a float.
fn location_id(document: &serde_json::Map<String, serde_json::Value>) -> Option<i64> {
    let value = document.get("location_id")?;
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
}

fn convert_hit(hit: Hit) -> Option<SearchHit> {
    let document = hit.document?;
    let Some(id) = location_id(&document) else {
        tracing::warn!(
            location_id = ?document.get("location_id"),
            "skipping hit with unusable location_id"
        );
        return None;
    };
    Some(SearchHit {
        id,
        vector_distance: hit.vector_distance,
        text_match: hit.text_match,
        rank_fusion_score: hit.hybrid_search_info.and_then(|info| info.rank_fusion_score),
    })
}

fn convert_result_set(set: ResultSet) -> SubQueryOutcome {
    if let Some(code) = set.code.filter(|&c| c != 200) {
        return Err(SubQueryFailure::new(
            Some(code),
            set.error.unwrap_or_else(|| "search failed".into()),
        ));
    }
    if let Some(error) = set.error {
        return Err(SubQueryFailure::new(set.code, error));
    }
    Ok(set
        .hits
        .unwrap_or_default()
        .into_iter()
        .filter_map(convert_hit)
        .collect())
}

/// Decode a `multi_search` response body into order-aligned outcomes.
///
/// # Errors
///
/// Returns [`SearchError::SearchEngineUnavailable`] if the body is not a
/// valid response.
pub fn parse_response(body: &str) -> Result<Vec<SubQueryOutcome>, SearchError> {
    let response: MultiSearchResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::SearchEngineUnavailable(format!("invalid response: {e}")))?;
    Ok(response.results.into_iter().map(convert_result_set).collect())
}

#[async_trait]
impl SearchBackend for TypesenseBackend {
    async fn multi_search(
        &self,
        requests: &[SubQuery],
    ) -> Result<Vec<SubQueryOutcome>, SearchError> {
        let response = self
            .client
            .post(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&self.build_request(requests))
            .send()
            .await
            .map_err(|e| SearchError::SearchEngineUnavailable(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SearchError::SearchEngineUnavailable(format!("read failed: {e}")))?;
        if !status.is_success() {
            return Err(SearchError::SearchEngineUnavailable(format!(
                "HTTP {}: {}",
                status.as_u16(),
                error_message(&body)
            )));
        }

        let outcomes = parse_response(&body)?;
        tracing::debug!(
            requested = requests.len(),
            returned = outcomes.len(),
            "multi_search completed"
        );
        Ok(outcomes)
    }
}
