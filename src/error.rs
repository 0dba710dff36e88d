//! Error handling module for devspec
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Every fallible resolver query returns these types.

use thiserror::Error;

/// Main error type for capability resolution
#[derive(Error, Debug)]
pub enum SpecError {
    /// A required live host query could not be performed
    #[error("Source unavailable: {provider}: {reason}")]
    SourceUnavailable { provider: String, reason: String },

    /// A live query returned a non-positive or out-of-domain value
    #[error("Invalid measurement: {what} = {value}")]
    InvalidMeasurement { what: String, value: String },

    /// Configuration errors (loading, parsing, validation)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors (host files, config files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for resolver operations
pub type Result<T> = std::result::Result<T, SpecError>;

// Convenient error constructors
impl SpecError {
    /// Create a source-unavailable error
    pub fn unavailable(provider: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            provider: provider.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid-measurement error
    pub fn invalid(what: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidMeasurement {
            what: what.into(),
            value: value.to_string(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns true for errors raised by a host source rather than by the caller.
    pub fn is_host_failure(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable { .. } | Self::InvalidMeasurement { .. } | Self::Io(_)
        )
    }
}
