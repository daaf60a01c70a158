//! Kafka ingest loop and dead-letter topic provisioning
//!
//! A single `StreamConsumer` subscribes to both inbound topics and routes each
//! message to the ingestor by topic name. Offsets are auto-committed by the
//! client.

use super::{RecordIngestor, BATCH_ID_HEADER};
use crate::config::{DeadLetterTopicConfig, KafkaConfig};
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::records::RecordKind;
use crate::store::BatchStore;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::{Headers, Message, OwnedMessage};
use rdkafka::types::RDKafkaErrorCode;
use rdkafka::ClientConfig;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

pub struct KafkaIngestLoop<S> {
    consumer: StreamConsumer,
    ingestor: Arc<RecordIngestor<S>>,
    event_topic: String,
    mention_topic: String,
}

impl<S> std::fmt::Debug for KafkaIngestLoop<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaIngestLoop")
            .field("consumer", &"StreamConsumer")
            .field("event_topic", &self.event_topic)
            .field("mention_topic", &self.mention_topic)
            .finish_non_exhaustive()
    }
}

impl<S: BatchStore> KafkaIngestLoop<S> {
    pub fn from_config(
        config: &KafkaConfig,
        ingestor: Arc<RecordIngestor<S>>,
    ) -> CoordinatorResult<Self> {
        let mut client = ClientConfig::new();
        client
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "true")
            .set("auto.offset.reset", "earliest");

        for (key, value) in &config.properties {
            client.set(key, value);
        }

        let consumer: StreamConsumer = client.create().map_err(|e| {
            CoordinatorError::Ingest(format!("Failed to create Kafka consumer: {e}"))
        })?;

        let topics = [
            config.topics.consumer_event.as_str(),
            config.topics.consumer_mention.as_str(),
        ];
        consumer.subscribe(&topics).map_err(|e| {
            CoordinatorError::Ingest(format!("Failed to subscribe to {topics:?}: {e}"))
        })?;

        info!(
            brokers = %config.brokers,
            group_id = %config.group_id,
            topics = ?topics,
            "Kafka consumer subscribed"
        );

        Ok(Self {
            consumer,
            ingestor,
            event_topic: config.topics.consumer_event.clone(),
            mention_topic: config.topics.consumer_mention.clone(),
        })
    }

    /// Consume until shutdown is signalled
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        while !*shutdown.borrow() {
            let message = tokio::select! {
                received = self.consumer.recv() => received.map(|m| m.detach()),
                _ = shutdown.changed() => break,
            };

            match message {
                Ok(message) => self.handle(message).await,
                Err(e) => error!(error = %e, "Kafka consumer error"),
            }
        }

        info!("Kafka ingest loop stopped");
    }

    async fn handle(&self, message: OwnedMessage) {
        let kind = if message.topic() == self.event_topic {
            RecordKind::Event
        } else if message.topic() == self.mention_topic {
            RecordKind::Mention
        } else {
            warn!(topic = %message.topic(), "Message from unexpected topic");
            return;
        };

        let batch_header = message.headers().and_then(|headers| {
            headers
                .iter()
                .find(|header| header.key == BATCH_ID_HEADER)
                .and_then(|header| header.value)
        });

        let outcome = self
            .ingestor
            .ingest_payload(kind, batch_header, message.payload().unwrap_or_default())
            .await;

        debug!(
            topic = %message.topic(),
            partition = message.partition(),
            offset = message.offset(),
            outcome = ?outcome,
            "Processed inbound message"
        );
    }
}

/// Create the event and mention dead-letter topics if they are missing
pub async fn provision_dead_letter_topics(config: &KafkaConfig) -> CoordinatorResult<()> {
    if !config.dlq.enabled {
        debug!("Dead-letter topic provisioning disabled");
        return Ok(());
    }

    let admin: AdminClient<DefaultClientContext> = ClientConfig::new()
        .set("bootstrap.servers", &config.brokers)
        .create()
        .map_err(|e| {
            CoordinatorError::Ingest(format!("Failed to create Kafka admin client: {e}"))
        })?;

    let topics: Vec<NewTopic<'_>> = [&config.dlq.event, &config.dlq.mention]
        .into_iter()
        .map(new_topic)
        .collect();

    let results = admin
        .create_topics(&topics, &AdminOptions::new())
        .await
        .map_err(|e| {
            CoordinatorError::Ingest(format!("Failed to create dead-letter topics: {e}"))
        })?;

    for result in results {
        match result {
            Ok(topic) => info!(topic = %topic, "Created dead-letter topic"),
            Err((topic, RDKafkaErrorCode::TopicAlreadyExists)) => {
                debug!(topic = %topic, "Dead-letter topic already exists")
            }
            Err((topic, code)) => {
                return Err(CoordinatorError::Ingest(format!(
                    "Failed to create dead-letter topic '{topic}': {code:?}"
                )));
            }
        }
    }

    Ok(())
}

fn new_topic(config: &DeadLetterTopicConfig) -> NewTopic<'_> {
    NewTopic::new(
        &config.name,
        config.partitions,
        TopicReplication::Fixed(config.replicas),
    )
}
