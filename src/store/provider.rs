//! Store provider selected from configuration
//!
//! Uses enum dispatch so the batch components stay generic over a single
//! concrete type at runtime without a vtable.

use super::errors::StoreResult;
use super::providers::{InMemoryBatchStore, RedisBatchStore};
use super::traits::BatchStore;
use crate::clock::Clock;
use crate::config::{StoreBackend, StoreConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Configured store backend
#[derive(Debug)]
pub enum StoreProvider {
    /// Redis store (boxed to keep the enum small)
    Redis(Box<RedisBatchStore>),

    /// Single-process store
    InMemory(InMemoryBatchStore),
}

impl StoreProvider {
    /// Build the backend named by configuration
    ///
    /// The in-memory backend shares `clock` for key expiry. Redis keeps its own
    /// time, so the clock is ignored there.
    pub async fn from_config(config: &StoreConfig, clock: Arc<dyn Clock>) -> StoreResult<Self> {
        let provider = match config.backend {
            StoreBackend::Redis => {
                Self::Redis(Box::new(RedisBatchStore::from_config(&config.redis).await?))
            }
            StoreBackend::Memory => Self::InMemory(InMemoryBatchStore::new(clock)),
        };

        info!(
            provider = provider.provider_name(),
            "Batch store provider initialized"
        );
        Ok(provider)
    }
}

impl BatchStore for StoreProvider {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match self {
            Self::Redis(s) => s.get(key).await,
            Self::InMemory(s) => s.get(key).await,
        }
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        match self {
            Self::Redis(s) => s.set_with_ttl(key, value, ttl).await,
            Self::InMemory(s) => s.set_with_ttl(key, value, ttl).await,
        }
    }

    async fn set_if_absent_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> StoreResult<bool> {
        match self {
            Self::Redis(s) => s.set_if_absent_with_ttl(key, value, ttl).await,
            Self::InMemory(s) => s.set_if_absent_with_ttl(key, value, ttl).await,
        }
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        match self {
            Self::Redis(s) => s.exists(key).await,
            Self::InMemory(s) => s.exists(key).await,
        }
    }

    async fn delete_many(&self, keys: &[String]) -> StoreResult<u64> {
        match self {
            Self::Redis(s) => s.delete_many(keys).await,
            Self::InMemory(s) => s.delete_many(keys).await,
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool> {
        match self {
            Self::Redis(s) => s.expire(key, ttl).await,
            Self::InMemory(s) => s.expire(key, ttl).await,
        }
    }

    async fn set_add(&self, key: &str, member: &str) -> StoreResult<bool> {
        match self {
            Self::Redis(s) => s.set_add(key, member).await,
            Self::InMemory(s) => s.set_add(key, member).await,
        }
    }

    async fn set_remove(&self, key: &str, member: &str) -> StoreResult<bool> {
        match self {
            Self::Redis(s) => s.set_remove(key, member).await,
            Self::InMemory(s) => s.set_remove(key, member).await,
        }
    }

    async fn set_move(&self, source: &str, destination: &str, member: &str) -> StoreResult<bool> {
        match self {
            Self::Redis(s) => s.set_move(source, destination, member).await,
            Self::InMemory(s) => s.set_move(source, destination, member).await,
        }
    }

    async fn set_members(&self, key: &str) -> StoreResult<Vec<String>> {
        match self {
            Self::Redis(s) => s.set_members(key).await,
            Self::InMemory(s) => s.set_members(key).await,
        }
    }

    async fn set_pop(&self, key: &str) -> StoreResult<Option<String>> {
        match self {
            Self::Redis(s) => s.set_pop(key).await,
            Self::InMemory(s) => s.set_pop(key).await,
        }
    }

    async fn health_check(&self) -> StoreResult<bool> {
        match self {
            Self::Redis(s) => s.health_check().await,
            Self::InMemory(s) => s.health_check().await,
        }
    }

    fn provider_name(&self) -> &'static str {
        match self {
            Self::Redis(s) => s.provider_name(),
            Self::InMemory(s) => s.provider_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[tokio::test]
    async fn test_memory_backend_from_config() {
        let config = StoreConfig {
            backend: StoreBackend::Memory,
            ..StoreConfig::default()
        };
        let provider = StoreProvider::from_config(&config, Arc::new(ManualClock::new(0)))
            .await
            .unwrap();

        assert_eq!(provider.provider_name(), "memory");
        assert!(provider.health_check().await.unwrap());

        provider.set_add("active:batches", "b1").await.unwrap();
        assert_eq!(
            provider.set_pop("active:batches").await.unwrap(),
            Some("b1".to_string())
        );
    }
}
