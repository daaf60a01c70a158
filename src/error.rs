//! Error types for the windowed batcher.

use crate::batch::stager::StageError;
use crate::config::ConfigurationError;
use crate::publish::PublishError;
use crate::records::InvalidBatchId;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Staging error: {0}")]
    Stage(#[from] StageError),
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("Invalid batch id: {0}")]
    InvalidBatchId(#[from] InvalidBatchId),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Ingest error: {0}")]
    Ingest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CoordinatorResult<T> = Result<T, CoordinatorError>;
