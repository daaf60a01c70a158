pub mod in_memory;
#[cfg(feature = "kafka")]
pub mod kafka;

pub use in_memory::{InMemoryPublisher, PublishedMessage};
#[cfg(feature = "kafka")]
pub use kafka::KafkaPublisher;
