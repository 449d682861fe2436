//! Shared HTTP client construction for the collaborator clients.

use std::time::Duration;

use crate::error::ServiceError;

const USER_AGENT: &str = concat!("whereismycity/", env!("CARGO_PKG_VERSION"));

/// Build a [`reqwest::Client`] with a per-request timeout.
///
/// # Errors
///
/// Returns [`ServiceError::HttpClient`] if the client cannot be constructed.
pub fn build_client(timeout_seconds: u64) -> Result<reqwest::Client, ServiceError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ServiceError::HttpClient(format!("failed to build HTTP client: {e}")))
}

/// Join a base URL and an absolute path without doubling the slash.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!("{}{path}", base.trim_end_matches('/'))
}

/// Extract an error message from a JSON error body, falling back to the raw text.
///
/// Understands both `{"error": {"message": ..}}` and `{"message": ..}` shapes.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .or_else(|| v.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_client_succeeds() {
        assert!(build_client(5).is_ok());
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        assert_eq!(
            endpoint("http://localhost:8108/", "/multi_search"),
            "http://localhost:8108/multi_search"
        );
        assert_eq!(
            endpoint("http://localhost:8108", "/multi_search"),
            "http://localhost:8108/multi_search"
        );
    }

    #[test]
    fn error_message_shapes() {
        assert_eq!(
            error_message(r#"{"error":{"message":"bad key"}}"#),
            "bad key"
        );
        assert_eq!(error_message(r#"{"message":"Not Found"}"#), "Not Found");
        assert_eq!(error_message("plain text"), "plain text");
    }
}
