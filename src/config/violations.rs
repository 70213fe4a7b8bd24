//! Configuration violations and load errors.

use thiserror::Error;

/// One problem found while validating a [`Config`](super::Config).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigViolation {
    #[error("{field} must be a positive duration (got {value})")]
    NonPositiveDuration { field: &'static str, value: f64 },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be finite (got {value})")]
    NotFinite { field: &'static str, value: f64 },

    #[error("transition needs at least one block")]
    NoBlocks,

    #[error("{field} range is inverted ({min} > {max})")]
    InvertedRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    #[error("{field} is not a valid trigger point: {reason}")]
    BadTriggerPoint { field: &'static str, reason: String },
}

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("configuration has {} violation(s)", .0.len())]
    Invalid(Vec<ConfigViolation>),
}
