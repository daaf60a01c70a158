//! Store error types

use thiserror::Error;

/// Errors raised by a [`BatchStore`](super::BatchStore) backend
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// Could not reach the backend
    #[error("Store connection error: {0}")]
    ConnectionError(String),

    /// Backend rejected or failed a command
    #[error("Store backend error: {operation} failed: {message}")]
    BackendError { operation: String, message: String },

    /// Backend did not answer in time
    #[error("Store operation timed out: {0}")]
    Timeout(String),

    /// A stored value could not be interpreted (wrong type, unparsable marker)
    #[error("Corrupt value at key '{key}': {reason}")]
    CorruptValue { key: String, reason: String },
}

impl StoreError {
    pub fn backend(operation: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::BackendError {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    /// Whether retrying the same operation later may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConnectionError(_) | Self::Timeout(_) | Self::BackendError { .. }
        )
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
