//! # Batch Registry
//!
//! Starts a batch's window the first time any record names it. The window
//! start is a marker key holding epoch millis; its TTL is the batch key TTL
//! (window + grace) so an abandoned batch disappears on its own.

use super::keys::{start_marker_key, ACTIVE_BATCHES_KEY};
use crate::clock::Clock;
use crate::config::BatchWindowConfig;
use crate::records::BatchId;
use crate::store::{BatchStore, StoreResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct BatchRegistry<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    window_duration: Duration,
    key_ttl: Duration,
}

impl<S> std::fmt::Debug for BatchRegistry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchRegistry")
            .field("window_duration", &self.window_duration)
            .field("key_ttl", &self.key_ttl)
            .finish_non_exhaustive()
    }
}

impl<S: BatchStore> BatchRegistry<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: &BatchWindowConfig) -> Self {
        Self {
            store,
            clock,
            window_duration: config.window_duration(),
            key_ttl: config.key_ttl(),
        }
    }

    /// Start the batch's window if it has not started yet
    ///
    /// Returns `true` when this call wrote the start marker and added the batch
    /// to the active set, `false` when a marker already existed (no writes).
    pub async fn register(&self, batch_id: &BatchId) -> StoreResult<bool> {
        let marker_key = start_marker_key(batch_id);
        let started_at = self.clock.now_millis();

        let is_new = self
            .store
            .set_if_absent_with_ttl(&marker_key, &started_at.to_string(), self.key_ttl)
            .await?;

        if !is_new {
            return Ok(false);
        }

        if let Err(e) = self.store.set_add(ACTIVE_BATCHES_KEY, batch_id.as_str()).await {
            // A marker without active membership would never be promoted; drop it so
            // a retried registration starts the window again.
            if let Err(rollback) = self.store.delete_many(&[marker_key]).await {
                warn!(
                    batch_id = %batch_id,
                    error = %rollback,
                    "Failed to roll back window start marker"
                );
            }
            return Err(e);
        }

        info!(
            batch_id = %batch_id,
            started_at = started_at,
            window_ms = self.window_duration.as_millis() as u64,
            "Registered new batch window"
        );

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::InMemoryBatchStore;

    fn setup() -> (Arc<ManualClock>, Arc<InMemoryBatchStore>, BatchRegistry<InMemoryBatchStore>) {
        let clock = Arc::new(ManualClock::new(1_000));
        let store = Arc::new(InMemoryBatchStore::new(clock.clone()));
        let registry =
            BatchRegistry::new(store.clone(), clock.clone(), &BatchWindowConfig::default());
        (clock, store, registry)
    }

    #[tokio::test]
    async fn test_register_is_once_per_batch() {
        let (clock, store, registry) = setup();
        let batch = BatchId::new("B1").unwrap();

        assert!(registry.register(&batch).await.unwrap());
        clock.advance_millis(500);
        assert!(!registry.register(&batch).await.unwrap());

        let marker = store.get(&start_marker_key(&batch)).await.unwrap();
        assert_eq!(marker.as_deref(), Some("1000"));
        assert_eq!(
            store.set_members(ACTIVE_BATCHES_KEY).await.unwrap(),
            vec!["B1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_marker_ttl_is_window_plus_grace() {
        let (_clock, store, registry) = setup();
        let batch = BatchId::new("B2").unwrap();

        registry.register(&batch).await.unwrap();

        assert_eq!(store.ttl_millis(&start_marker_key(&batch)), Some(70_000));
    }

    #[tokio::test]
    async fn test_registers_again_after_marker_expires() {
        let (clock, _store, registry) = setup();
        let batch = BatchId::new("B3").unwrap();

        assert!(registry.register(&batch).await.unwrap());
        clock.advance_millis(70_000);
        assert!(registry.register(&batch).await.unwrap());
    }
}
