//! OpenAI-compatible embeddings client.
//!
//! Calls `POST {base_url}/v1/embeddings` with bearer authentication and
//! returns the first embedding in the response.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use city_search::{Embedder, Embedding, SearchError};

use super::http::{build_client, endpoint, error_message};
use crate::config::EmbeddingsConfig;
use crate::error::ServiceError;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embeddings client for any OpenAI-compatible endpoint.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiEmbedder")
            .field("url", &self.url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiEmbedder {
    /// # Errors
    ///
    /// Returns [`ServiceError::HttpClient`] if the HTTP client cannot be built.
    pub fn new(config: &EmbeddingsConfig) -> Result<Self, ServiceError> {
        Ok(Self {
            url: endpoint(&config.base_url, "/v1/embeddings"),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            client: build_client(config.timeout_seconds)?,
        })
    }

    fn map_http_error(status: reqwest::StatusCode, body: &str) -> SearchError {
        let message = error_message(body);
        match status.as_u16() {
            401 => SearchError::EmbeddingUnavailable(format!("authentication failed: {message}")),
            429 => SearchError::EmbeddingUnavailable(format!("rate limited: {message}")),
            code => SearchError::EmbeddingUnavailable(format!("HTTP {code}: {message}")),
        }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, SearchError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .await
            .map_err(|e| SearchError::EmbeddingUnavailable(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_http_error(status, &body));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| SearchError::EmbeddingUnavailable(format!("invalid response: {e}")))?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| SearchError::EmbeddingUnavailable("response contained no embeddings".into()))?;
        if embedding.is_empty() {
            return Err(SearchError::EmbeddingUnavailable("empty embedding".into()));
        }
        Ok(embedding)
    }
}
