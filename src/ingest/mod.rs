//! # Ingest Path
//!
//! Every inbound record registers its batch (starting the window on first
//! sight) and is then staged. Store failures retry the whole attempt with a
//! fixed backoff; anything that cannot succeed by retrying is skipped.
//!
//! The batch id travels out of band in the `X-Batch-ID` message header.

mod ingestor;
#[cfg(feature = "kafka")]
pub mod kafka;

pub use ingestor::{IngestOutcome, IngestStats, RecordIngestor, SkipReason};

/// Message header carrying the batch id
pub const BATCH_ID_HEADER: &str = "X-Batch-ID";
