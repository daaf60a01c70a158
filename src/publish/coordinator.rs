//! # Publish Coordinator
//!
//! Publishes every document of a batch concurrently and waits for all of
//! them. The batch counts as published only when every record was
//! acknowledged; records that did succeed are never rolled back.

use super::{Destination, PublishError, RecordPublisher};
use crate::records::BatchId;
use crate::transform::TransformedBatch;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// The first record of a batch that could not be published
#[derive(Debug, Clone, PartialEq)]
pub struct PublishFailure {
    pub destination: Destination,
    pub key: String,
    pub error: PublishError,
}

/// Result of publishing one batch
#[derive(Debug, Clone, PartialEq)]
pub struct PublishOutcome {
    pub batch_id: BatchId,
    pub attempted: usize,
    pub succeeded: usize,
    /// First failure in submission order, events before mentions
    pub first_failure: Option<PublishFailure>,
}

impl PublishOutcome {
    pub fn is_success(&self) -> bool {
        self.first_failure.is_none()
    }

    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }
}

struct PendingRecord {
    destination: Destination,
    key: String,
    payload: Result<String, PublishError>,
}

impl PendingRecord {
    fn new<T: Serialize>(destination: Destination, key: String, document: &T) -> Self {
        let payload = serde_json::to_string(document).map_err(|e| PublishError::Serialization {
            key: key.clone(),
            message: e.to_string(),
        });
        Self {
            destination,
            key,
            payload,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PublishCoordinator {
    publisher: Arc<dyn RecordPublisher>,
}

impl PublishCoordinator {
    pub fn new(publisher: Arc<dyn RecordPublisher>) -> Self {
        Self { publisher }
    }

    pub fn publisher(&self) -> &Arc<dyn RecordPublisher> {
        &self.publisher
    }

    /// Publish each document individually, then join all acknowledgments
    pub async fn publish(&self, batch: &TransformedBatch) -> PublishOutcome {
        let start = Instant::now();

        let pending: Vec<PendingRecord> = batch
            .events
            .iter()
            .map(|doc| PendingRecord::new(Destination::Events, doc.publish_key(), doc))
            .chain(
                batch
                    .mentions
                    .iter()
                    .map(|doc| PendingRecord::new(Destination::Mentions, doc.publish_key(), doc)),
            )
            .collect();

        let results = join_all(pending.iter().map(|record| self.publish_one(record))).await;

        let attempted = results.len();
        let mut succeeded = 0;
        let mut first_failure = None;

        for (record, result) in pending.iter().zip(results) {
            match result {
                Ok(()) => succeeded += 1,
                Err(error) => {
                    debug!(
                        batch_id = %batch.batch_id,
                        destination = %record.destination,
                        key = %record.key,
                        error = %error,
                        "Record publish failed"
                    );
                    first_failure.get_or_insert(PublishFailure {
                        destination: record.destination,
                        key: record.key.clone(),
                        error,
                    });
                }
            }
        }

        let outcome = PublishOutcome {
            batch_id: batch.batch_id.clone(),
            attempted,
            succeeded,
            first_failure,
        };

        match &outcome.first_failure {
            None => info!(
                batch_id = %batch.batch_id,
                events = batch.events.len(),
                mentions = batch.mentions.len(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Batch published"
            ),
            Some(failure) => error!(
                batch_id = %batch.batch_id,
                attempted = attempted,
                failed = outcome.failed(),
                destination = %failure.destination,
                key = %failure.key,
                error = %failure.error,
                "Batch publish failed"
            ),
        }

        outcome
    }

    async fn publish_one(&self, record: &PendingRecord) -> Result<(), PublishError> {
        let payload = record.payload.as_ref().map_err(Clone::clone)?;
        self.publisher
            .publish(record.destination, &record.key, payload)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publish::InMemoryPublisher;
    use crate::records::{EventDocument, MentionDocument};

    fn batch() -> TransformedBatch {
        TransformedBatch {
            batch_id: BatchId::new("B1").unwrap(),
            events: vec![
                EventDocument {
                    global_event_id: 1,
                    ..EventDocument::default()
                },
                EventDocument {
                    global_event_id: 2,
                    ..EventDocument::default()
                },
            ],
            mentions: vec![MentionDocument {
                global_event_id: 1,
                mention_identifier: "doc".to_string(),
                ..MentionDocument::default()
            }],
        }
    }

    #[tokio::test]
    async fn test_publishes_one_record_per_document() {
        let publisher = Arc::new(InMemoryPublisher::new());
        let coordinator = PublishCoordinator::new(publisher.clone());

        let outcome = coordinator.publish(&batch()).await;

        assert!(outcome.is_success());
        assert_eq!(outcome.attempted, 3);
        assert_eq!(outcome.succeeded, 3);

        let mut event_keys: Vec<String> = publisher
            .published_to(Destination::Events)
            .into_iter()
            .map(|m| m.key)
            .collect();
        event_keys.sort();
        assert_eq!(event_keys, vec!["1", "2"]);

        let mentions = publisher.published_to(Destination::Mentions);
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].key, "1_doc");
        assert!(mentions[0].payload.contains("\"mentionIdentifier\":\"doc\""));
    }

    #[tokio::test]
    async fn test_single_failure_fails_batch_without_rollback() {
        let publisher = Arc::new(InMemoryPublisher::new());
        publisher.fail_key(Destination::Mentions, "1_doc");
        let coordinator = PublishCoordinator::new(publisher.clone());

        let outcome = coordinator.publish(&batch()).await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.failed(), 1);
        let failure = outcome.first_failure.unwrap();
        assert_eq!(failure.destination, Destination::Mentions);
        assert_eq!(failure.key, "1_doc");

        // Events already acknowledged stay published
        assert_eq!(publisher.published_to(Destination::Events).len(), 2);
    }

    #[tokio::test]
    async fn test_empty_batch_is_trivially_published() {
        let coordinator = PublishCoordinator::new(Arc::new(InMemoryPublisher::new()));
        let empty = TransformedBatch {
            batch_id: BatchId::new("empty").unwrap(),
            events: Vec::new(),
            mentions: Vec::new(),
        };

        let outcome = coordinator.publish(&empty).await;
        assert!(outcome.is_success());
        assert_eq!(outcome.attempted, 0);
    }
}
