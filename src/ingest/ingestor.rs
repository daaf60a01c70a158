use crate::batch::registry::BatchRegistry;
use crate::batch::stager::{RecordStager, StageError};
use crate::config::RetryConfig;
use crate::records::{BatchId, Event, Mention, RecordKind, StagedRecord};
use crate::store::BatchStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Why a record was dropped without touching the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingBatchId,
    InvalidBatchId(String),
    UndecodablePayload(String),
    Unserializable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Registered and staged; `new_window` when this record opened the batch
    Staged { new_window: bool, attempts: u32 },
    Skipped(SkipReason),
    /// Store kept failing through every retry; the record is dropped
    Exhausted { attempts: u32, last_error: String },
}

impl IngestOutcome {
    pub fn is_staged(&self) -> bool {
        matches!(self, IngestOutcome::Staged { .. })
    }
}

#[derive(Debug, Default)]
pub struct IngestStats {
    records_staged: AtomicU64,
    records_skipped: AtomicU64,
    records_exhausted: AtomicU64,
    retries: AtomicU64,
}

impl IngestStats {
    pub fn records_staged(&self) -> u64 {
        self.records_staged.load(Ordering::Relaxed)
    }

    pub fn records_skipped(&self) -> u64 {
        self.records_skipped.load(Ordering::Relaxed)
    }

    pub fn records_exhausted(&self) -> u64 {
        self.records_exhausted.load(Ordering::Relaxed)
    }

    pub fn retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }
}

pub struct RecordIngestor<S> {
    registry: Arc<BatchRegistry<S>>,
    stager: Arc<RecordStager<S>>,
    max_retry_attempts: u32,
    retry_interval: Duration,
    stats: IngestStats,
}

impl<S> std::fmt::Debug for RecordIngestor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordIngestor")
            .field("max_retry_attempts", &self.max_retry_attempts)
            .field("retry_interval", &self.retry_interval)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<S: BatchStore> RecordIngestor<S> {
    pub fn new(
        registry: Arc<BatchRegistry<S>>,
        stager: Arc<RecordStager<S>>,
        retry: &RetryConfig,
    ) -> Self {
        Self {
            registry,
            stager,
            max_retry_attempts: retry.max_retry_attempts,
            retry_interval: retry.interval(),
            stats: IngestStats::default(),
        }
    }

    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    pub async fn ingest_event(&self, batch_id: &BatchId, event: &Event) -> IngestOutcome {
        self.ingest(batch_id, event).await
    }

    pub async fn ingest_mention(&self, batch_id: &BatchId, mention: &Mention) -> IngestOutcome {
        self.ingest(batch_id, mention).await
    }

    /// Decode a raw broker message and ingest it
    ///
    /// `batch_header` is the raw `X-Batch-ID` header value, if present.
    pub async fn ingest_payload(
        &self,
        kind: RecordKind,
        batch_header: Option<&[u8]>,
        payload: &[u8],
    ) -> IngestOutcome {
        let batch_id = match parse_batch_header(batch_header) {
            Ok(batch_id) => batch_id,
            Err(reason) => return self.skip(kind, None, reason),
        };

        let decoded = match kind {
            RecordKind::Event => match serde_json::from_slice::<Event>(payload) {
                Ok(event) => return self.ingest(&batch_id, &event).await,
                Err(e) => e,
            },
            RecordKind::Mention => match serde_json::from_slice::<Mention>(payload) {
                Ok(mention) => return self.ingest(&batch_id, &mention).await,
                Err(e) => e,
            },
        };

        let reason = SkipReason::UndecodablePayload(decoded.to_string());
        self.skip(kind, Some(&batch_id), reason)
    }

    /// Register the batch then stage the record, retrying store failures
    pub async fn ingest<R: StagedRecord>(&self, batch_id: &BatchId, record: &R) -> IngestOutcome {
        let total_attempts = self.max_retry_attempts.saturating_add(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match self.attempt(batch_id, record).await {
                Ok(new_window) => {
                    if new_window {
                        info!(
                            batch_id = %batch_id,
                            kind = %R::KIND,
                            "First record for batch, window started"
                        );
                    }
                    self.stats.records_staged.fetch_add(1, Ordering::Relaxed);
                    return IngestOutcome::Staged {
                        new_window,
                        attempts: attempt,
                    };
                }
                Err(AttemptError::Serialization(e)) => {
                    return self.skip(R::KIND, Some(batch_id), SkipReason::Unserializable(e));
                }
                Err(AttemptError::Store(e)) => e,
            };

            if attempt >= total_attempts {
                error!(
                    batch_id = %batch_id,
                    kind = %R::KIND,
                    record_id = %record.record_id(),
                    attempts = attempt,
                    error = %error,
                    "Record ingest failed after all retries, dropping record"
                );
                self.stats.records_exhausted.fetch_add(1, Ordering::Relaxed);
                return IngestOutcome::Exhausted {
                    attempts: attempt,
                    last_error: error,
                };
            }

            warn!(
                batch_id = %batch_id,
                kind = %R::KIND,
                attempt = attempt,
                max_attempts = total_attempts,
                retry_in_ms = self.retry_interval.as_millis() as u64,
                error = %error,
                "Record ingest failed, retrying"
            );
            self.stats.retries.fetch_add(1, Ordering::Relaxed);
            tokio::time::sleep(self.retry_interval).await;
        }
    }

    async fn attempt<R: StagedRecord>(
        &self,
        batch_id: &BatchId,
        record: &R,
    ) -> Result<bool, AttemptError> {
        let new_window = self
            .registry
            .register(batch_id)
            .await
            .map_err(|e| AttemptError::Store(e.to_string()))?;

        self.stager
            .stage(batch_id, record)
            .await
            .map_err(|e| match e {
                StageError::Serialization { .. } => AttemptError::Serialization(e.to_string()),
                StageError::Store(store) => AttemptError::Store(store.to_string()),
            })?;

        Ok(new_window)
    }

    fn skip(
        &self,
        kind: RecordKind,
        batch_id: Option<&BatchId>,
        reason: SkipReason,
    ) -> IngestOutcome {
        match &reason {
            // Producers keep sending under the same id, so every record of
            // that batch is lost
            SkipReason::InvalidBatchId(raw) => error!(
                kind = %kind,
                batch_id = %raw,
                "Batch id cannot be used in store keys, dropping record"
            ),
            _ => warn!(
                kind = %kind,
                batch_id = ?batch_id.map(BatchId::as_str),
                reason = ?reason,
                "Skipping inbound record"
            ),
        }
        self.stats.records_skipped.fetch_add(1, Ordering::Relaxed);
        IngestOutcome::Skipped(reason)
    }
}

enum AttemptError {
    Serialization(String),
    Store(String),
}

fn parse_batch_header(header: Option<&[u8]>) -> Result<BatchId, SkipReason> {
    let raw = header.ok_or(SkipReason::MissingBatchId)?;
    let text = std::str::from_utf8(raw)
        .map_err(|_| SkipReason::InvalidBatchId(String::from_utf8_lossy(raw).into_owned()))?;
    let trimmed = text.trim();
    BatchId::new(trimmed).map_err(|_| SkipReason::InvalidBatchId(trimmed.to_string()))
}
