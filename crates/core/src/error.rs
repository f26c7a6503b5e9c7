//! Core error types for Marcus operations.
//!
//! Request parameter errors are reported to clients as 400 responses.

use std::path::PathBuf;

use thiserror::Error;

/// Core error type for Marcus operations.
#[derive(Debug, Error)]
pub enum Error {
    // Request parameter errors
    #[error("invalid value for parameter '{name}': '{value}' ({reason})")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("invalid date '{value}': expected yyyy-MM-dd, yyyy-MM or yyyy")]
    InvalidDate { value: String },

    #[error("aggregations must be a JSON array of objects: {reason}")]
    InvalidAggregations { reason: String },

    #[error("unknown service '{name}', expected one of {expected}")]
    UnknownService { name: String, expected: String },

    // Configuration errors
    #[error("failed to read config file '{path}': {reason}")]
    ConfigReadFailed { path: PathBuf, reason: String },

    #[error("TOML parse error: {reason}")]
    ConfigParseFailed { reason: String },

    // Backend payload errors
    #[error("JSON parse error: {reason}")]
    JsonParseFailed { reason: String },
}

impl Error {
    /// Create an invalid parameter error.
    pub fn invalid_parameter(
        name: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid date error.
    pub fn invalid_date(value: impl Into<String>) -> Self {
        Self::InvalidDate {
            value: value.into(),
        }
    }

    /// Create an invalid aggregations error.
    pub fn invalid_aggregations(reason: impl Into<String>) -> Self {
        Self::InvalidAggregations {
            reason: reason.into(),
        }
    }

    /// Create a config read error.
    pub fn config_read_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ConfigReadFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a JSON parse error.
    pub fn json_parse_failed(reason: impl Into<String>) -> Self {
        Self::JsonParseFailed {
            reason: reason.into(),
        }
    }

    /// Whether the error was caused by the caller's input rather than by
    /// configuration or backend payloads.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter { .. }
                | Self::InvalidDate { .. }
                | Self::InvalidAggregations { .. }
                | Self::UnknownService { .. }
        )
    }
}
