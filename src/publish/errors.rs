//! Publish error types

use super::Destination;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PublishError {
    #[error("Failed to serialize document '{key}': {message}")]
    Serialization { key: String, message: String },

    #[error("{destination} publish of '{key}' rejected: {message}")]
    Rejected {
        destination: Destination,
        key: String,
        message: String,
    },

    #[error("{destination} publish of '{key}' not acknowledged within {timeout_ms}ms")]
    Timeout {
        destination: Destination,
        key: String,
        timeout_ms: u64,
    },

    #[error("Publisher unavailable: {0}")]
    Unavailable(String),
}
