//! # Record Stager
//!
//! Persists one record against its batch: the serialized record under its
//! data key, then its id in the batch's membership set for that kind. Both
//! carry the batch key TTL, which every stage call refreshes on the set.
//!
//! The data write and the membership update are separate store calls. A
//! reader can briefly see a data key without its id in the set, which the
//! materializer never observes as an error.

use super::keys::{data_key, membership_key};
use crate::config::BatchWindowConfig;
use crate::records::{BatchId, RecordKind, StagedRecord};
use crate::store::{BatchStore, StoreError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("Failed to serialize {kind} '{record_id}': {source}")]
    Serialization {
        kind: RecordKind,
        record_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl StageError {
    /// Whether repeating the attempt could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, StageError::Store(_))
    }
}

pub struct RecordStager<S> {
    store: Arc<S>,
    key_ttl: Duration,
}

impl<S> std::fmt::Debug for RecordStager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStager")
            .field("key_ttl", &self.key_ttl)
            .finish_non_exhaustive()
    }
}

impl<S: BatchStore> RecordStager<S> {
    pub fn new(store: Arc<S>, config: &BatchWindowConfig) -> Self {
        Self {
            store,
            key_ttl: config.key_ttl(),
        }
    }

    /// Stage a record; the batch does not need to be registered yet
    pub async fn stage<R: StagedRecord>(
        &self,
        batch_id: &BatchId,
        record: &R,
    ) -> Result<(), StageError> {
        let record_id = record.record_id();
        let payload =
            serde_json::to_string(record).map_err(|source| StageError::Serialization {
                kind: R::KIND,
                record_id: record_id.clone(),
                source,
            })?;

        let key = data_key(R::KIND, batch_id, &record_id);
        self.store.set_with_ttl(&key, &payload, self.key_ttl).await?;

        let set_key = membership_key(R::KIND, batch_id);
        self.store.set_add(&set_key, &record_id).await?;
        self.store.expire(&set_key, self.key_ttl).await?;

        debug!(
            batch_id = %batch_id,
            kind = %R::KIND,
            record_id = %record_id,
            "Staged record"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::records::{Event, Mention};
    use crate::store::InMemoryBatchStore;

    fn setup() -> (Arc<InMemoryBatchStore>, RecordStager<InMemoryBatchStore>) {
        let clock = Arc::new(ManualClock::new(0));
        let store = Arc::new(InMemoryBatchStore::new(clock));
        let stager = RecordStager::new(store.clone(), &BatchWindowConfig::default());
        (store, stager)
    }

    #[tokio::test]
    async fn test_stage_writes_data_and_membership() {
        let (store, stager) = setup();
        let batch = BatchId::new("B1").unwrap();
        let event = Event {
            global_event_id: 11,
            ..Event::default()
        };

        stager.stage(&batch, &event).await.unwrap();

        let raw = store.get("data:event:B1:11").await.unwrap().unwrap();
        let stored: Event = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored, event);
        assert_eq!(
            store.set_members("batch:events:B1").await.unwrap(),
            vec!["11".to_string()]
        );
        assert_eq!(store.ttl_millis("data:event:B1:11"), Some(70_000));
        assert_eq!(store.ttl_millis("batch:events:B1"), Some(70_000));
    }

    #[tokio::test]
    async fn test_restaging_same_id_overwrites() {
        let (store, stager) = setup();
        let batch = BatchId::new("B1").unwrap();
        let mut mention = Mention {
            global_event_id: 5,
            mention_identifier: "doc".to_string(),
            ..Mention::default()
        };

        stager.stage(&batch, &mention).await.unwrap();
        mention.confidence = Some(80);
        stager.stage(&batch, &mention).await.unwrap();

        assert_eq!(store.set_members("batch:mentions:B1").await.unwrap().len(), 1);
        let raw = store.get("data:mention:B1:5_doc").await.unwrap().unwrap();
        assert!(raw.contains("\"confidence\":80"));
    }

    #[derive(serde::Serialize, serde::Deserialize)]
    struct Unserializable {
        #[serde(serialize_with = "refuse")]
        id: String,
    }

    #[allow(clippy::ptr_arg)]
    fn refuse<Ser: serde::Serializer>(_: &String, _: Ser) -> Result<Ser::Ok, Ser::Error> {
        Err(serde::ser::Error::custom("refused"))
    }

    impl StagedRecord for Unserializable {
        const KIND: RecordKind = RecordKind::Event;

        fn record_id(&self) -> String {
            self.id.clone()
        }
    }

    #[tokio::test]
    async fn test_serialization_failure_writes_nothing() {
        let (store, stager) = setup();
        let batch = BatchId::new("B1").unwrap();

        let err = stager
            .stage(
                &batch,
                &Unserializable {
                    id: "x".to_string(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StageError::Serialization { .. }));
        assert!(!err.is_retryable());
        assert_eq!(store.live_key_count(), 0);
    }
}
