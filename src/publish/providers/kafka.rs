//! Kafka publisher
//!
//! One `FutureProducer` shared by both destinations. Each publish waits for
//! the broker's delivery report, bounded by `kafka.delivery_timeout_ms`.

use crate::config::{KafkaConfig, TopicsConfig};
use crate::publish::{Destination, PublishError, PublishReceipt, RecordPublisher};
use async_trait::async_trait;
use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::types::RDKafkaErrorCode;
use rdkafka::util::Timeout;
use rdkafka::ClientConfig;
use std::time::Duration;
use tracing::{debug, warn};

pub struct KafkaPublisher {
    producer: FutureProducer,
    topics: TopicsConfig,
    delivery_timeout: Duration,
}

impl std::fmt::Debug for KafkaPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaPublisher")
            .field("producer", &"FutureProducer")
            .field("topics", &self.topics)
            .field("delivery_timeout", &self.delivery_timeout)
            .finish()
    }
}

impl KafkaPublisher {
    pub fn from_config(config: &KafkaConfig) -> Result<Self, PublishError> {
        let mut client = ClientConfig::new();
        client
            .set("bootstrap.servers", &config.brokers)
            .set("message.timeout.ms", config.delivery_timeout_ms.to_string())
            .set("acks", "all");

        for (key, value) in &config.properties {
            client.set(key, value);
        }

        let producer: FutureProducer = client.create().map_err(|e| {
            PublishError::Unavailable(format!("Failed to create Kafka producer: {e}"))
        })?;

        debug!(brokers = %config.brokers, "Kafka producer created");

        Ok(Self {
            producer,
            topics: config.topics.clone(),
            delivery_timeout: config.delivery_timeout(),
        })
    }

    fn topic_for(&self, destination: Destination) -> &str {
        match destination {
            Destination::Events => &self.topics.producer_event,
            Destination::Mentions => &self.topics.producer_mention,
        }
    }

    fn map_delivery_error(
        &self,
        destination: Destination,
        key: &str,
        err: KafkaError,
    ) -> PublishError {
        match err.rdkafka_error_code() {
            Some(RDKafkaErrorCode::MessageTimedOut) => PublishError::Timeout {
                destination,
                key: key.to_string(),
                timeout_ms: self.delivery_timeout.as_millis() as u64,
            },
            _ => PublishError::Rejected {
                destination,
                key: key.to_string(),
                message: err.to_string(),
            },
        }
    }
}

#[async_trait]
impl RecordPublisher for KafkaPublisher {
    async fn publish(
        &self,
        destination: Destination,
        key: &str,
        payload: &str,
    ) -> Result<PublishReceipt, PublishError> {
        let record = FutureRecord::to(self.topic_for(destination))
            .key(key)
            .payload(payload);

        match self
            .producer
            .send(record, Timeout::After(self.delivery_timeout))
            .await
        {
            Ok((partition, offset)) => Ok(PublishReceipt { partition, offset }),
            Err((err, _message)) => Err(self.map_delivery_error(destination, key, err)),
        }
    }

    fn publisher_name(&self) -> &'static str {
        "kafka"
    }
}

impl Drop for KafkaPublisher {
    fn drop(&mut self) {
        debug!("Flushing producer queue");
        if let Err(e) = self.producer.flush(Duration::from_secs(5)) {
            warn!(error = %e, "Kafka producer flush failed on shutdown");
        }
    }
}
