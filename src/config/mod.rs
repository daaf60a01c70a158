//! # Coordinator Configuration
//!
//! Typed configuration for the batching coordinator, loaded in layers by
//! [`ConfigLoader`]:
//!
//! 1. Built-in defaults ([`CoordinatorConfig::default`])
//! 2. Optional TOML file (`WINDOWED_BATCHER_CONFIG_PATH`, else
//!    `config/windowed-batcher.toml` when present)
//! 3. Environment variables, prefix `WINDOWED_BATCHER`, separator `__`
//!
//! ```toml
//! [batch]
//! window_duration_ms = 60000
//! scan_interval_ms = 5000
//! dispatch_interval_ms = 3000
//! grace_period_ms = 10000
//!
//! [store]
//! backend = "redis"
//!
//! [store.redis]
//! url = "redis://localhost:6379"
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use windowed_batcher::config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new().load()?;
//! assert_eq!(config.batch.key_ttl().as_millis(), 70_000);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::{load_config, ConfigLoader};

/// Root configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    pub batch: BatchWindowConfig,
    pub store: StoreConfig,
    pub kafka: KafkaConfig,
    pub retry: RetryConfig,
    pub logging: LoggingConfig,
}

impl CoordinatorConfig {
    /// Reject values the coordinator cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        self.batch.validate()?;
        self.store.validate()?;
        self.kafka.validate()?;
        self.retry.validate()?;
        Ok(())
    }
}

/// Window timing shared by every batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchWindowConfig {
    /// How long a batch accepts records after its first arrival
    pub window_duration_ms: u64,
    /// Cadence of the window expiry scanner
    pub scan_interval_ms: u64,
    /// Cadence of the ready-batch dispatcher
    pub dispatch_interval_ms: u64,
    /// Added to the window duration to form every key's TTL
    pub grace_period_ms: u64,
}

impl Default for BatchWindowConfig {
    fn default() -> Self {
        Self {
            window_duration_ms: 60_000,
            scan_interval_ms: 5_000,
            dispatch_interval_ms: 3_000,
            grace_period_ms: 10_000,
        }
    }
}

impl BatchWindowConfig {
    pub fn window_duration(&self) -> Duration {
        Duration::from_millis(self.window_duration_ms)
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.scan_interval_ms)
    }

    pub fn dispatch_interval(&self) -> Duration {
        Duration::from_millis(self.dispatch_interval_ms)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    /// TTL applied to every data and state key: window + grace period
    pub fn key_ttl(&self) -> Duration {
        self.window_duration() + self.grace_period()
    }

    fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [
            ("batch.window_duration_ms", self.window_duration_ms),
            ("batch.scan_interval_ms", self.scan_interval_ms),
            ("batch.dispatch_interval_ms", self.dispatch_interval_ms),
        ] {
            if value == 0 {
                return Err(ConfigurationError::invalid_value(
                    field,
                    value,
                    "must be greater than zero",
                ));
            }
        }
        Ok(())
    }
}

/// Which store backend to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Redis,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub redis: RedisConfig,
}

impl StoreConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.backend == StoreBackend::Redis && self.redis.url.trim().is_empty() {
            return Err(ConfigurationError::MissingRequiredField {
                field: "store.redis.url".to_string(),
                context: "store backend 'redis'".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub url: String,
    pub connection_timeout_ms: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connection_timeout_ms: 5_000,
        }
    }
}

/// Broker connection, topic names and dead-letter provisioning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KafkaConfig {
    /// Comma-separated `host:port` list
    pub brokers: String,
    pub group_id: String,
    pub topics: TopicsConfig,
    /// Upper bound on waiting for a single publish acknowledgment
    pub delivery_timeout_ms: u64,
    pub dlq: DeadLetterConfig,
    /// Extra librdkafka properties passed through verbatim
    pub properties: BTreeMap<String, String>,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            group_id: "windowed-batcher".to_string(),
            topics: TopicsConfig::default(),
            delivery_timeout_ms: 5_000,
            dlq: DeadLetterConfig::default(),
            properties: BTreeMap::new(),
        }
    }
}

impl KafkaConfig {
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }

    fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [
            ("kafka.topics.consumer_event", &self.topics.consumer_event),
            ("kafka.topics.consumer_mention", &self.topics.consumer_mention),
            ("kafka.topics.producer_event", &self.topics.producer_event),
            ("kafka.topics.producer_mention", &self.topics.producer_mention),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigurationError::MissingRequiredField {
                    field: field.to_string(),
                    context: "kafka topics".to_string(),
                });
            }
        }

        if self.dlq.enabled {
            self.dlq.event.validate("kafka.dlq.event")?;
            self.dlq.mention.validate("kafka.dlq.mention")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicsConfig {
    pub consumer_event: String,
    pub consumer_mention: String,
    pub producer_event: String,
    pub producer_mention: String,
}

impl Default for TopicsConfig {
    fn default() -> Self {
        Self {
            consumer_event: "adapter-event".to_string(),
            consumer_mention: "adapter-mention".to_string(),
            producer_event: "processor-event".to_string(),
            producer_mention: "processor-mention".to_string(),
        }
    }
}

/// Dead-letter topics created at startup for the upstream connector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeadLetterConfig {
    pub enabled: bool,
    pub event: DeadLetterTopicConfig,
    pub mention: DeadLetterTopicConfig,
}

impl Default for DeadLetterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            event: DeadLetterTopicConfig {
                name: "dlq-connect-event".to_string(),
                ..DeadLetterTopicConfig::default()
            },
            mention: DeadLetterTopicConfig {
                name: "dlq-connect-mention".to_string(),
                ..DeadLetterTopicConfig::default()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeadLetterTopicConfig {
    pub name: String,
    pub partitions: i32,
    pub replicas: i32,
}

impl Default for DeadLetterTopicConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            partitions: 1,
            replicas: 1,
        }
    }
}

impl DeadLetterTopicConfig {
    fn validate(&self, prefix: &str) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigurationError::MissingRequiredField {
                field: format!("{prefix}.name"),
                context: "dead-letter topic".to_string(),
            });
        }
        if self.partitions < 1 {
            return Err(ConfigurationError::invalid_value(
                format!("{prefix}.partitions"),
                self.partitions,
                "must be at least 1",
            ));
        }
        if self.replicas < 1 {
            return Err(ConfigurationError::invalid_value(
                format!("{prefix}.replicas"),
                self.replicas,
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Fixed-backoff retry for the ingest path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retry_attempts: u32,
    pub interval_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retry_attempts: 3,
            interval_ms: 1_000,
        }
    }
}

impl RetryConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.max_retry_attempts > 0 && self.interval_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "retry.interval_ms",
                self.interval_ms,
                "must be greater than zero when retries are enabled",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            level: "info".to_string(),
        }
    }
}
