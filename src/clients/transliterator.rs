//! HTTP transliteration client.
//!
//! `POST {url}/transliterate` with `{"text": ..}`, answering
//! `{"transliteration": ..}`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use city_search::{SearchError, Transliterator};

use super::http::{build_client, endpoint, error_message};
use crate::config::TransliteratorConfig;
use crate::error::ServiceError;

#[derive(Debug, Serialize)]
struct TransliterateRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TransliterateResponse {
    transliteration: String,
}

/// Client for the transliteration service.
#[derive(Debug, Clone)]
pub struct HttpTransliterator {
    url: String,
    client: reqwest::Client,
}

impl HttpTransliterator {
    /// # Errors
    ///
    /// Returns [`ServiceError::HttpClient`] if the HTTP client cannot be built.
    pub fn new(config: &TransliteratorConfig) -> Result<Self, ServiceError> {
        Ok(Self {
            url: endpoint(&config.url, "/transliterate"),
            client: build_client(config.timeout_seconds)?,
        })
    }
}

#[async_trait]
impl Transliterator for HttpTransliterator {
    async fn transliterate(&self, text: &str) -> Result<String, SearchError> {
        let response = self
            .client
            .post(&self.url)
            .json(&TransliterateRequest { text })
            .send()
            .await
            .map_err(|e| {
                SearchError::TransliterationUnavailable(format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::TransliterationUnavailable(format!(
                "HTTP {}: {}",
                status.as_u16(),
                error_message(&body)
            )));
        }

        let parsed: TransliterateResponse = response.json().await.map_err(|e| {
            SearchError::TransliterationUnavailable(format!("invalid response: {e}"))
        })?;
        Ok(parsed.transliteration)
    }
}
