//! # Batch Materializer
//!
//! Loads every staged record of a claimed batch. Missing data keys are
//! skipped silently (expired or cleaned); undecodable values are logged and
//! skipped. Only store failures abort the load.

use super::keys::{data_key, membership_key};
use crate::records::{BatchId, Event, Mention, StagedRecord};
use crate::store::{BatchStore, StoreResult};
use std::sync::Arc;
use tracing::{debug, warn};

/// Records staged for one batch
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializedBatch {
    pub batch_id: BatchId,
    pub events: Vec<Event>,
    pub mentions: Vec<Mention>,
}

impl MaterializedBatch {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.mentions.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.events.len() + self.mentions.len()
    }
}

pub struct BatchMaterializer<S> {
    store: Arc<S>,
}

impl<S> std::fmt::Debug for BatchMaterializer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchMaterializer").finish_non_exhaustive()
    }
}

impl<S: BatchStore> BatchMaterializer<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn load(&self, batch_id: &BatchId) -> StoreResult<MaterializedBatch> {
        let events = self.load_kind::<Event>(batch_id).await?;
        let mentions = self.load_kind::<Mention>(batch_id).await?;

        debug!(
            batch_id = %batch_id,
            events = events.len(),
            mentions = mentions.len(),
            "Materialized batch"
        );

        Ok(MaterializedBatch {
            batch_id: batch_id.clone(),
            events,
            mentions,
        })
    }

    async fn load_kind<R: StagedRecord>(&self, batch_id: &BatchId) -> StoreResult<Vec<R>> {
        let ids = self
            .store
            .set_members(&membership_key(R::KIND, batch_id))
            .await?;

        let mut records = Vec::with_capacity(ids.len());
        for record_id in ids {
            let key = data_key(R::KIND, batch_id, &record_id);
            let Some(raw) = self.store.get(&key).await? else {
                continue;
            };

            match serde_json::from_str::<R>(&raw) {
                Ok(record) => records.push(record),
                Err(e) => warn!(
                    batch_id = %batch_id,
                    kind = %R::KIND,
                    record_id = %record_id,
                    error = %e,
                    "Skipping staged record that failed to deserialize"
                ),
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::stager::RecordStager;
    use crate::clock::ManualClock;
    use crate::config::BatchWindowConfig;
    use crate::store::InMemoryBatchStore;
    use std::time::Duration;

    fn setup() -> (
        Arc<InMemoryBatchStore>,
        RecordStager<InMemoryBatchStore>,
        BatchMaterializer<InMemoryBatchStore>,
    ) {
        let clock = Arc::new(ManualClock::new(0));
        let store = Arc::new(InMemoryBatchStore::new(clock));
        (
            store.clone(),
            RecordStager::new(store.clone(), &BatchWindowConfig::default()),
            BatchMaterializer::new(store),
        )
    }

    fn event(id: i64) -> Event {
        Event {
            global_event_id: id,
            ..Event::default()
        }
    }

    #[tokio::test]
    async fn test_empty_batch_loads_empty() {
        let (_, _, materializer) = setup();
        let batch = BatchId::new("nothing").unwrap();

        let loaded = materializer.load(&batch).await.unwrap();
        assert!(loaded.is_empty());
        assert_eq!(loaded.batch_id, batch);
    }

    #[tokio::test]
    async fn test_missing_data_key_is_skipped() {
        let (store, stager, materializer) = setup();
        let batch = BatchId::new("B1").unwrap();
        stager.stage(&batch, &event(1)).await.unwrap();
        stager.stage(&batch, &event(2)).await.unwrap();

        store
            .delete_many(&["data:event:B1:1".to_string()])
            .await
            .unwrap();

        let loaded = materializer.load(&batch).await.unwrap();
        assert_eq!(loaded.events, vec![event(2)]);
    }

    #[tokio::test]
    async fn test_undecodable_record_is_skipped() {
        let (store, stager, materializer) = setup();
        let batch = BatchId::new("B1").unwrap();
        stager.stage(&batch, &event(1)).await.unwrap();

        store.set_add("batch:events:B1", "2").await.unwrap();
        store
            .set_with_ttl("data:event:B1:2", "{not json", Duration::from_secs(60))
            .await
            .unwrap();

        let loaded = materializer.load(&batch).await.unwrap();
        assert_eq!(loaded.events, vec![event(1)]);
        assert_eq!(loaded.record_count(), 1);
    }

    #[tokio::test]
    async fn test_mentions_loaded_independently_of_events() {
        let (_, stager, materializer) = setup();
        let batch = BatchId::new("B1").unwrap();
        let mention = Mention {
            global_event_id: 404,
            mention_identifier: "orphan-doc".to_string(),
            ..Mention::default()
        };
        stager.stage(&batch, &mention).await.unwrap();

        let loaded = materializer.load(&batch).await.unwrap();
        assert!(loaded.events.is_empty());
        assert_eq!(loaded.mentions, vec![mention]);
    }
}
