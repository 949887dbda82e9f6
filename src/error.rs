//! Error types for the triad pipeline

use crate::types::Role;
use thiserror::Error;

/// Result type alias for triad operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the triad pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid provider credential or parameter
    #[error("configuration error: {0}")]
    Config(String),

    /// Task or iteration input rejected before the pipeline starts
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Model identifier matches no known provider family
    #[error("unsupported model: {0}")]
    UnsupportedModel(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider call exceeded its deadline
    #[error("request timed out after {secs}s")]
    Timeout {
        /// Deadline that was exceeded, in seconds
        secs: u64,
    },

    /// Non-success status from a provider endpoint
    #[error("provider returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Excerpt of the response body
        body: String,
    },

    /// Response parsed as JSON but the expected field is absent or mis-shaped
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A contained step failure escalated by `RecoveryPolicy::AbortOnFailure`
    #[error("{role} step failed: {message}")]
    StepFailed {
        /// Role whose step failed
        role: Role,
        /// Summary of the contained failure
        message: String,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid-input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an unsupported-model error
    pub fn unsupported_model(model: impl Into<String>) -> Self {
        Self::UnsupportedModel(model.into())
    }

    /// Create a malformed-response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }
}
