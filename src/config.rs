//! Configuration types for the whereismycity service.
//!
//! Loaded from TOML with every section optional; secrets and endpoints can
//! be overridden from the environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use city_search::SearchConfig;

use crate::error::{Result, ServiceError};

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Search pipeline settings.
    pub search: SearchConfig,
    /// Typesense search engine settings.
    pub typesense: TypesenseConfig,
    /// Embedding API settings.
    pub embeddings: EmbeddingsConfig,
    /// Transliteration service settings.
    pub transliterator: TransliteratorConfig,
    /// Location database settings.
    pub database: DatabaseConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            server: ServerConfig::default(),
            search: SearchConfig::default(),
            typesense: TypesenseConfig::default(),
            embeddings: EmbeddingsConfig::default(),
            transliterator: TransliteratorConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    /// Port to bind (0 = auto-assign).
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8000,
        }
    }
}

/// Typesense configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TypesenseConfig {
    /// Base URL, e.g. `http://localhost:8108`.
    pub url: String,
    pub api_key: String,
    pub collection: String,
    /// Fields searched lexically, in weight order.
    pub query_by: String,
    pub query_by_weights: String,
    /// Hybrid alpha passed in the vector query.
    pub vector_alpha: f64,
    /// Nearest neighbours considered by the vector query.
    pub vector_k: usize,
    pub timeout_seconds: u64,
}

impl Default for TypesenseConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8108".to_owned(),
            api_key: String::new(),
            collection: "locations".to_owned(),
            query_by: "city,translations,state,country".to_owned(),
            query_by_weights: "5,3,1,1".to_owned(),
            vector_alpha: 0.3,
            vector_k: 100,
            timeout_seconds: 30,
        }
    }
}

/// OpenAI-compatible embeddings configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingsConfig {
    /// Base URL (defaults to `https://api.openai.com`).
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_owned(),
            api_key: String::new(),
            model: "text-embedding-3-small".to_owned(),
            timeout_seconds: 30,
        }
    }
}

/// Transliteration service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransliteratorConfig {
    /// Base URL, e.g. `http://localhost:5005`.
    pub url: String,
    pub timeout_seconds: u64,
}

impl Default for TransliteratorConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5005".to_owned(),
            timeout_seconds: 30,
        }
    }
}

/// Location database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("whereismycity.db"),
        }
    }
}

/// Environment variables that override file settings.
const ENV_OVERRIDES: &[&str] = &[
    "LOG_LEVEL",
    "SERVER_HOST",
    "SERVER_PORT",
    "TYPESENSE_URL",
    "TYPESENSE_API_KEY",
    "OPENAI_BASE_URL",
    "OPENAI_API_KEY",
    "TRANSLITERATOR_URL",
    "DATABASE_PATH",
];

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ServiceError::Config(e.to_string()))
    }

    /// Load from `path` if given, otherwise defaults; then apply environment
    /// overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded, an override is
    /// malformed, or the result fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides looked up through `lookup` (normally the process
    /// environment). Empty values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Config`] if `SERVER_PORT` is not a port number.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        for &key in ENV_OVERRIDES {
            let Some(value) = lookup(key).filter(|v| !v.is_empty()) else {
                continue;
            };
            match key {
                "LOG_LEVEL" => self.log_level = value,
                "SERVER_HOST" => self.server.host = value,
                "SERVER_PORT" => {
                    self.server.port = value.parse().map_err(|_| {
                        ServiceError::Config(format!("SERVER_PORT is not a valid port: {value}"))
                    })?;
                }
                "TYPESENSE_URL" => self.typesense.url = value,
                "TYPESENSE_API_KEY" => self.typesense.api_key = value,
                "OPENAI_BASE_URL" => self.embeddings.base_url = value,
                "OPENAI_API_KEY" => self.embeddings.api_key = value,
                "TRANSLITERATOR_URL" => self.transliterator.url = value,
                "DATABASE_PATH" => self.database.path = PathBuf::from(value),
                _ => {}
            }
        }
        Ok(())
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.search
            .validate()
            .map_err(|e| ServiceError::Config(e.to_string()))?;
        for (name, url) in [
            ("typesense.url", &self.typesense.url),
            ("embeddings.base_url", &self.embeddings.base_url),
            ("transliterator.url", &self.transliterator.url),
        ] {
            url::Url::parse(url)
                .map_err(|e| ServiceError::Config(format!("{name} is not a valid URL: {e}")))?;
        }
        for (name, secs) in [
            ("typesense.timeout_seconds", self.typesense.timeout_seconds),
            ("embeddings.timeout_seconds", self.embeddings.timeout_seconds),
            ("transliterator.timeout_seconds", self.transliterator.timeout_seconds),
        ] {
            if secs == 0 {
                return Err(ServiceError::Config(format!("{name} must be greater than 0")));
            }
        }
        if self.typesense.collection.is_empty() {
            return Err(ServiceError::Config(
                "typesense.collection must not be empty".into(),
            ));
        }
        if self.typesense.vector_k == 0 {
            return Err(ServiceError::Config(
                "typesense.vector_k must be greater than 0".into(),
            ));
        }
        if self.embeddings.model.is_empty() {
            return Err(ServiceError::Config("embeddings.model must not be empty".into()));
        }
        Ok(())
    }
}
