//! In-memory publisher
//!
//! Records every message it accepts. Failures can be injected per key or per
//! destination to exercise the partial-publish paths.

use crate::publish::{Destination, PublishError, PublishReceipt, RecordPublisher};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub destination: Destination,
    pub key: String,
    pub payload: String,
    pub offset: i64,
}

#[derive(Debug, Default)]
struct PublisherState {
    messages: Vec<PublishedMessage>,
    failing_keys: HashSet<(Destination, String)>,
    failing_destinations: HashSet<Destination>,
}

#[derive(Debug, Default)]
pub struct InMemoryPublisher {
    state: Mutex<PublisherState>,
}

impl InMemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every publish of `key` to `destination`
    pub fn fail_key(&self, destination: Destination, key: impl Into<String>) {
        self.state
            .lock()
            .failing_keys
            .insert((destination, key.into()));
    }

    /// Reject every publish to `destination`
    pub fn fail_destination(&self, destination: Destination) {
        self.state.lock().failing_destinations.insert(destination);
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock();
        state.failing_keys.clear();
        state.failing_destinations.clear();
    }

    pub fn published(&self) -> Vec<PublishedMessage> {
        self.state.lock().messages.clone()
    }

    pub fn published_to(&self, destination: Destination) -> Vec<PublishedMessage> {
        self.state
            .lock()
            .messages
            .iter()
            .filter(|message| message.destination == destination)
            .cloned()
            .collect()
    }

    pub fn published_count(&self) -> usize {
        self.state.lock().messages.len()
    }
}

#[async_trait]
impl RecordPublisher for InMemoryPublisher {
    async fn publish(
        &self,
        destination: Destination,
        key: &str,
        payload: &str,
    ) -> Result<PublishReceipt, PublishError> {
        let mut state = self.state.lock();

        if state.failing_destinations.contains(&destination)
            || state.failing_keys.contains(&(destination, key.to_string()))
        {
            return Err(PublishError::Rejected {
                destination,
                key: key.to_string(),
                message: "injected failure".to_string(),
            });
        }

        let offset = state.messages.len() as i64;
        state.messages.push(PublishedMessage {
            destination,
            key: key.to_string(),
            payload: payload.to_string(),
            offset,
        });
        debug!(destination = %destination, key = %key, offset = offset, "Published (memory)");

        Ok(PublishReceipt {
            partition: 0,
            offset,
        })
    }

    fn publisher_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_messages_in_order() {
        let publisher = InMemoryPublisher::new();
        publisher.publish(Destination::Events, "a", "{}").await.unwrap();
        let receipt = publisher.publish(Destination::Mentions, "b", "{}").await.unwrap();

        assert_eq!(receipt.offset, 1);
        assert_eq!(publisher.published_count(), 2);
        assert_eq!(publisher.published_to(Destination::Mentions)[0].key, "b");
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let publisher = InMemoryPublisher::new();
        publisher.fail_destination(Destination::Events);

        assert!(publisher.publish(Destination::Events, "a", "{}").await.is_err());
        assert!(publisher.publish(Destination::Mentions, "a", "{}").await.is_ok());

        publisher.clear_failures();
        assert!(publisher.publish(Destination::Events, "a", "{}").await.is_ok());
    }
}
