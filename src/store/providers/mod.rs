//! Concrete store backends

pub mod in_memory;
pub mod redis;

pub use in_memory::InMemoryBatchStore;
pub use redis::RedisBatchStore;
