//! # Batch Cleaner
//!
//! Removes every key a published batch left behind. Runs only after a fully
//! successful publish. Failures are logged and swallowed: whatever is left
//! expires with the batch key TTL.

use super::keys::{
    data_key, membership_key, start_marker_key, ACTIVE_BATCHES_KEY, READY_BATCHES_KEY,
};
use crate::records::{BatchId, RecordKind};
use crate::store::{BatchStore, StoreResult};
use std::sync::Arc;
use tracing::{debug, error, info};

pub struct BatchCleaner<S> {
    store: Arc<S>,
}

impl<S> std::fmt::Debug for BatchCleaner<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchCleaner").finish_non_exhaustive()
    }
}

impl<S: BatchStore> BatchCleaner<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Delete all data and state keys of the batch
    ///
    /// Returns `true` when every step succeeded.
    pub async fn cleanup(&self, batch_id: &BatchId) -> bool {
        match self.try_cleanup(batch_id).await {
            Ok(deleted) => {
                info!(batch_id = %batch_id, keys_deleted = deleted, "Batch state cleaned up");
                true
            }
            Err(e) => {
                error!(
                    batch_id = %batch_id,
                    error = %e,
                    "Batch cleanup failed, remaining keys will expire by TTL"
                );
                false
            }
        }
    }

    async fn try_cleanup(&self, batch_id: &BatchId) -> StoreResult<u64> {
        let mut deleted = 0;
        for kind in RecordKind::ALL {
            deleted += self.cleanup_kind(kind, batch_id).await?;
        }

        self.store
            .set_remove(READY_BATCHES_KEY, batch_id.as_str())
            .await?;
        self.store
            .set_remove(ACTIVE_BATCHES_KEY, batch_id.as_str())
            .await?;
        deleted += self
            .store
            .delete_many(&[start_marker_key(batch_id)])
            .await?;

        Ok(deleted)
    }

    async fn cleanup_kind(&self, kind: RecordKind, batch_id: &BatchId) -> StoreResult<u64> {
        let set_key = membership_key(kind, batch_id);
        let mut keys: Vec<String> = self
            .store
            .set_members(&set_key)
            .await?
            .iter()
            .map(|record_id| data_key(kind, batch_id, record_id))
            .collect();
        keys.push(set_key);

        let deleted = self.store.delete_many(&keys).await?;
        debug!(
            batch_id = %batch_id,
            kind = %kind,
            requested = keys.len(),
            deleted = deleted,
            "Deleted staged records and membership set"
        );
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::registry::BatchRegistry;
    use crate::batch::stager::RecordStager;
    use crate::clock::ManualClock;
    use crate::config::BatchWindowConfig;
    use crate::records::{Event, Mention};
    use crate::store::InMemoryBatchStore;

    fn event(global_event_id: i64) -> Event {
        Event {
            global_event_id,
            ..Event::default()
        }
    }

    #[tokio::test]
    async fn test_cleanup_removes_every_batch_key() {
        let clock = Arc::new(ManualClock::new(0));
        let store = Arc::new(InMemoryBatchStore::new(clock.clone()));
        let config = BatchWindowConfig::default();
        let registry = BatchRegistry::new(store.clone(), clock, &config);
        let stager = RecordStager::new(store.clone(), &config);
        let cleaner = BatchCleaner::new(store.clone());

        let batch = BatchId::new("B1").unwrap();
        let other = BatchId::new("B2").unwrap();
        registry.register(&batch).await.unwrap();
        registry.register(&other).await.unwrap();
        stager.stage(&batch, &event(1)).await.unwrap();
        stager
            .stage(
                &batch,
                &Mention {
                    global_event_id: 1,
                    mention_identifier: "m".to_string(),
                    ..Mention::default()
                },
            )
            .await
            .unwrap();
        store.set_add(READY_BATCHES_KEY, "B1").await.unwrap();

        assert!(cleaner.cleanup(&batch).await);

        for key in [
            "data:event:B1:1",
            "data:mention:B1:1_m",
            "batch:events:B1",
            "batch:mentions:B1",
            "batch:start:B1",
        ] {
            assert!(!store.exists(key).await.unwrap(), "{key} should be gone");
        }
        assert!(store.set_members(READY_BATCHES_KEY).await.unwrap().is_empty());
        assert_eq!(
            store.set_members(ACTIVE_BATCHES_KEY).await.unwrap(),
            vec!["B2".to_string()]
        );
        assert!(store.exists("batch:start:B2").await.unwrap());
    }

    #[tokio::test]
    async fn test_cleanup_of_unknown_batch_succeeds() {
        let store = Arc::new(InMemoryBatchStore::new(Arc::new(ManualClock::new(0))));
        let cleaner = BatchCleaner::new(store.clone());

        assert!(cleaner.cleanup(&BatchId::new("never-seen").unwrap()).await);
        assert_eq!(store.live_key_count(), 0);
    }
}
