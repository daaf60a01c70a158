//! # Publish Boundary
//!
//! Transformed documents leave the coordinator through a [`RecordPublisher`],
//! one publish per document. The [`PublishCoordinator`] fans a whole batch
//! out, joins every acknowledgment, and reports the first failure if any.
//!
//! ```text
//! PublishCoordinator
//!   └── Arc<dyn RecordPublisher>
//!         ├── KafkaPublisher     (feature "kafka", FutureProducer)
//!         └── InMemoryPublisher  (tests, memory backend runs)
//! ```

pub mod coordinator;
pub mod errors;
pub mod providers;

pub use coordinator::{PublishCoordinator, PublishFailure, PublishOutcome};
pub use errors::PublishError;
pub use providers::{InMemoryPublisher, PublishedMessage};
#[cfg(feature = "kafka")]
pub use providers::KafkaPublisher;

use async_trait::async_trait;
use std::fmt;

/// Output stream a document is published to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Events,
    Mentions,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Events => f.write_str("events"),
            Destination::Mentions => f.write_str("mentions"),
        }
    }
}

/// Broker acknowledgment of one published record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishReceipt {
    pub partition: i32,
    pub offset: i64,
}

/// Sends a single keyed record to an output destination
#[async_trait]
pub trait RecordPublisher: Send + Sync + fmt::Debug {
    /// Resolves once the destination acknowledged the record
    async fn publish(
        &self,
        destination: Destination,
        key: &str,
        payload: &str,
    ) -> Result<PublishReceipt, PublishError>;

    fn publisher_name(&self) -> &'static str;
}
