//! # Ready-Batch Dispatcher
//!
//! Background service that claims one ready batch per tick and drives it
//! through the rest of its lifecycle.
//!
//! ## Dispatch Flow
//!
//! 1. Timer tick triggers a dispatch cycle
//! 2. `SPOP ready:batches` claims at most one batch
//! 3. Materialize staged records
//! 4. Transform into documents
//! 5. Publish every document and join the acknowledgments
//! 6. Clean up the batch's keys, only if every publish succeeded
//!
//! A batch that fails to materialize or publish is not requeued and not
//! cleaned. Its keys expire by TTL (window + grace). A claim is never retried
//! within a cycle, and shutdown is only observed between cycles, so an
//! in-flight batch always runs to completion.

use super::cleaner::BatchCleaner;
use super::keys::READY_BATCHES_KEY;
use super::materializer::BatchMaterializer;
use crate::config::BatchWindowConfig;
use crate::publish::{PublishCoordinator, PublishFailure};
use crate::records::BatchId;
use crate::store::{BatchStore, StoreResult};
use crate::transform::BatchTransformer;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// What a single dispatch cycle did
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Nothing was ready
    Idle,
    /// Published and cleaned up
    Published {
        batch_id: BatchId,
        records: usize,
        cleaned: bool,
    },
    /// Staged records could not be read; left for TTL expiry
    MaterializeFailed { batch_id: BatchId, error: String },
    /// At least one record was not acknowledged; left for TTL expiry
    PublishFailed {
        batch_id: BatchId,
        failure: PublishFailure,
    },
    /// The ready set could not be popped
    ClaimFailed { error: String },
}

/// Counters for the dispatcher loop
#[derive(Debug, Default)]
pub struct DispatcherStats {
    dispatch_cycles: AtomicU64,
    batches_published: AtomicU64,
    batches_failed: AtomicU64,
    records_published: AtomicU64,
    claim_failures: AtomicU64,
}

impl DispatcherStats {
    pub fn dispatch_cycles(&self) -> u64 {
        self.dispatch_cycles.load(Ordering::Relaxed)
    }

    pub fn batches_published(&self) -> u64 {
        self.batches_published.load(Ordering::Relaxed)
    }

    pub fn batches_failed(&self) -> u64 {
        self.batches_failed.load(Ordering::Relaxed)
    }

    pub fn records_published(&self) -> u64 {
        self.records_published.load(Ordering::Relaxed)
    }

    pub fn claim_failures(&self) -> u64 {
        self.claim_failures.load(Ordering::Relaxed)
    }
}

pub struct ReadyBatchDispatcher<S> {
    store: Arc<S>,
    materializer: BatchMaterializer<S>,
    transformer: Arc<dyn BatchTransformer>,
    publisher: PublishCoordinator,
    cleaner: BatchCleaner<S>,
    dispatch_interval: Duration,
    stats: DispatcherStats,
}

impl<S> std::fmt::Debug for ReadyBatchDispatcher<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadyBatchDispatcher")
            .field("publisher", &self.publisher)
            .field("dispatch_interval", &self.dispatch_interval)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<S: BatchStore> ReadyBatchDispatcher<S> {
    pub fn new(
        store: Arc<S>,
        transformer: Arc<dyn BatchTransformer>,
        publisher: PublishCoordinator,
        config: &BatchWindowConfig,
    ) -> Self {
        Self {
            materializer: BatchMaterializer::new(store.clone()),
            cleaner: BatchCleaner::new(store.clone()),
            store,
            transformer,
            publisher,
            dispatch_interval: config.dispatch_interval(),
            stats: DispatcherStats::default(),
        }
    }

    pub fn stats(&self) -> &DispatcherStats {
        &self.stats
    }

    /// Atomically take one batch out of the ready set
    ///
    /// Each ready batch id is returned to exactly one caller. A member that is
    /// not a valid batch id is discarded and reported as nothing ready.
    pub async fn claim_next(&self) -> StoreResult<Option<BatchId>> {
        let Some(member) = self.store.set_pop(READY_BATCHES_KEY).await? else {
            return Ok(None);
        };

        match BatchId::new(member.as_str()) {
            Ok(batch_id) => Ok(Some(batch_id)),
            Err(e) => {
                warn!(batch_id = %member, error = %e, "Discarding malformed id from ready batches");
                Ok(None)
            }
        }
    }

    /// Claim at most one ready batch and process it
    pub async fn dispatch_once(&self) -> DispatchOutcome {
        match self.claim_next().await {
            Ok(Some(batch_id)) => self.process(batch_id).await,
            Ok(None) => {
                debug!("No ready batches to dispatch");
                DispatchOutcome::Idle
            }
            Err(e) => {
                self.stats.claim_failures.fetch_add(1, Ordering::Relaxed);
                error!(error = %e, "Failed to claim a ready batch");
                DispatchOutcome::ClaimFailed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Materialize, transform, publish and clean up a claimed batch
    pub async fn process(&self, batch_id: BatchId) -> DispatchOutcome {
        let start = Instant::now();
        info!(batch_id = %batch_id, "Processing claimed batch");

        let materialized = match self.materializer.load(&batch_id).await {
            Ok(materialized) => materialized,
            Err(e) => {
                self.stats.batches_failed.fetch_add(1, Ordering::Relaxed);
                error!(
                    batch_id = %batch_id,
                    error = %e,
                    "Failed to materialize batch, leaving it to expire"
                );
                return DispatchOutcome::MaterializeFailed {
                    batch_id,
                    error: e.to_string(),
                };
            }
        };

        let transformed = self.transformer.transform(materialized);
        let outcome = self.publisher.publish(&transformed).await;

        if let Some(failure) = outcome.first_failure {
            self.stats.batches_failed.fetch_add(1, Ordering::Relaxed);
            // Already logged with the failing record by the publish coordinator
            return DispatchOutcome::PublishFailed { batch_id, failure };
        }

        let cleaned = self.cleaner.cleanup(&batch_id).await;

        self.stats.batches_published.fetch_add(1, Ordering::Relaxed);
        self.stats
            .records_published
            .fetch_add(outcome.succeeded as u64, Ordering::Relaxed);

        info!(
            batch_id = %batch_id,
            records = outcome.succeeded,
            cleaned = cleaned,
            duration_ms = start.elapsed().as_millis() as u64,
            "Batch dispatched"
        );

        DispatchOutcome::Published {
            batch_id,
            records: outcome.succeeded,
            cleaned,
        }
    }

    /// Run dispatch cycles on the configured interval until shutdown is signalled
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.dispatch_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_ms = self.dispatch_interval.as_millis() as u64,
            "Starting ready-batch dispatcher"
        );

        while !*shutdown.borrow() {
            tokio::select! {
                _ = ticker.tick() => {
                    self.stats.dispatch_cycles.fetch_add(1, Ordering::Relaxed);
                    self.dispatch_once().await;
                }
                _ = shutdown.changed() => break,
            }
        }

        info!(
            dispatch_cycles = self.stats.dispatch_cycles(),
            batches_published = self.stats.batches_published(),
            batches_failed = self.stats.batches_failed(),
            "Ready-batch dispatcher stopped"
        );
    }
}
