//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls result limits, the per-sub-query fan-out size,
//! the request deadline, and the rank-fusion weights.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::SearchError;

/// Weights of the rank-fusion formula.
///
/// ```text
/// score = vector_weight * (1 - distance) + text_weight * min(log10(text) / text_log_divisor, 1)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionWeights {
    /// Weight of the vector-proximity component.
    pub vector_weight: f64,
    /// Weight of the lexical component.
    pub text_weight: f64,
    /// Divisor applied to `log10(text_match)`; the engine's text scores top
    /// out around 1e20.
    pub text_log_divisor: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            vector_weight: 0.3,
            text_weight: 0.7,
            text_log_divisor: 20.0,
        }
    }
}

/// Configuration for a location search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Result limit used when the caller asks for 0.
    pub default_limit: usize,
    /// Largest result limit honoured; larger requests are clamped.
    pub max_limit: usize,
    /// Hits requested from each sub-query, independent of the caller's limit.
    pub per_sub_query_limit: usize,
    /// Deadline for the whole pipeline, in milliseconds.
    pub deadline_ms: u64,
    /// Rank-fusion weights.
    pub fusion: FusionWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
            per_sub_query_limit: 50,
            deadline_ms: 5_000,
            fusion: FusionWeights::default(),
        }
    }
}

impl SearchConfig {
    /// The request deadline as a [`Duration`].
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    /// Resolve the caller's limit: 0 means the default, anything above
    /// `max_limit` is clamped.
    pub fn effective_limit(&self, requested: usize) -> usize {
        match requested {
            0 => self.default_limit,
            n => n.min(self.max_limit),
        }
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `default_limit`, `max_limit`, `per_sub_query_limit` and `deadline_ms`
    ///   must be greater than 0
    /// - `default_limit` must be <= `max_limit`
    /// - fusion weights must be finite and non-negative, with a positive sum
    /// - `text_log_divisor` must be finite and positive
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.default_limit == 0 {
            return Err(SearchError::Config(
                "default_limit must be greater than 0".into(),
            ));
        }
        if self.max_limit == 0 {
            return Err(SearchError::Config("max_limit must be greater than 0".into()));
        }
        if self.default_limit > self.max_limit {
            return Err(SearchError::Config(
                "default_limit must be <= max_limit".into(),
            ));
        }
        if self.per_sub_query_limit == 0 {
            return Err(SearchError::Config(
                "per_sub_query_limit must be greater than 0".into(),
            ));
        }
        if self.deadline_ms == 0 {
            return Err(SearchError::Config(
                "deadline_ms must be greater than 0".into(),
            ));
        }
        let FusionWeights {
            vector_weight,
            text_weight,
            text_log_divisor,
        } = self.fusion;
        if !vector_weight.is_finite() || !text_weight.is_finite() {
            return Err(SearchError::Config("fusion weights must be finite".into()));
        }
        if vector_weight < 0.0 || text_weight < 0.0 {
            return Err(SearchError::Config(
                "fusion weights must be non-negative".into(),
            ));
        }
        if vector_weight + text_weight <= 0.0 {
            return Err(SearchError::Config(
                "fusion weights must not both be zero".into(),
            ));
        }
        if !text_log_divisor.is_finite() || text_log_divisor <= 0.0 {
            return Err(SearchError::Config(
                "text_log_divisor must be a positive number".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = SearchConfig::default();
        assert_eq!(config.default_limit, 20);
        assert_eq!(config.max_limit, 100);
        assert_eq!(config.per_sub_query_limit, 50);
        assert_eq!(config.deadline(), Duration::from_secs(5));
        assert!((config.fusion.vector_weight - 0.3).abs() < f64::EPSILON);
        assert!((config.fusion.text_weight - 0.7).abs() < f64::EPSILON);
        assert!((config.fusion.text_log_divisor - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(SearchConfig::default().validate().is_ok());
    }

    #[test]
    fn effective_limit_defaults_and_clamps() {
        let config = SearchConfig::default();
        assert_eq!(config.effective_limit(0), 20);
        assert_eq!(config.effective_limit(5), 5);
        assert_eq!(config.effective_limit(100), 100);
        assert_eq!(config.effective_limit(1_000), 100);
    }

    #[test]
    fn zero_per_sub_query_limit_rejected() {
        let config = SearchConfig {
            per_sub_query_limit: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("per_sub_query_limit"));
    }

    #[test]
    fn zero_deadline_rejected() {
        let config = SearchConfig {
            deadline_ms: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("deadline_ms"));
    }

    #[test]
    fn default_above_max_rejected() {
        let config = SearchConfig {
            default_limit: 50,
            max_limit: 10,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("default_limit"));
    }

    #[test]
    fn negative_weight_rejected() {
        let config = SearchConfig {
            fusion: FusionWeights {
                vector_weight: -0.1,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("non-negative"));
    }

    #[test]
    fn zero_weights_rejected() {
        let config = SearchConfig {
            fusion: FusionWeights {
                vector_weight: 0.0,
                text_weight: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn nan_divisor_rejected() {
        let config = SearchConfig {
            fusion: FusionWeights {
                text_log_divisor: f64::NAN,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("text_log_divisor"));
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: SearchConfig = toml::from_str(
            r#"
            per_sub_query_limit = 25

            [fusion]
            text_weight = 0.5
            "#,
        )
        .expect("parse");
        assert_eq!(config.per_sub_query_limit, 25);
        assert_eq!(config.default_limit, 20);
        assert!((config.fusion.text_weight - 0.5).abs() < f64::EPSILON);
        assert!((config.fusion.vector_weight - 0.3).abs() < f64::EPSILON);
    }
}
