//! # Window Expiry Scanner
//!
//! Background service that promotes batches whose window has closed from the
//! active set to the ready set.
//!
//! ## Scan Flow
//!
//! 1. Timer tick triggers a scan cycle
//! 2. Every member of `active:batches` is checked against its start marker
//! 3. `now - start >= window` moves the batch to `ready:batches` (SMOVE)
//! 4. A batch without a readable marker is dropped from the active set
//!
//! One failing batch never stops the cycle, and a failing cycle never stops
//! the loop. Promotion is a single atomic move, so concurrent scans promote
//! and count each batch once.

use super::keys::{start_marker_key, ACTIVE_BATCHES_KEY, READY_BATCHES_KEY};
use crate::clock::Clock;
use crate::config::BatchWindowConfig;
use crate::records::BatchId;
use crate::store::{BatchStore, StoreResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Counters for the scanner loop
#[derive(Debug, Default)]
pub struct ScannerStats {
    scan_cycles: AtomicU64,
    failed_cycles: AtomicU64,
    batches_promoted: AtomicU64,
    orphans_dropped: AtomicU64,
}

impl ScannerStats {
    pub fn scan_cycles(&self) -> u64 {
        self.scan_cycles.load(Ordering::Relaxed)
    }

    pub fn failed_cycles(&self) -> u64 {
        self.failed_cycles.load(Ordering::Relaxed)
    }

    pub fn batches_promoted(&self) -> u64 {
        self.batches_promoted.load(Ordering::Relaxed)
    }

    pub fn orphans_dropped(&self) -> u64 {
        self.orphans_dropped.load(Ordering::Relaxed)
    }
}

enum WindowState {
    Open,
    Promoted,
    Orphaned,
}

pub struct WindowExpiryScanner<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    window_millis: i64,
    scan_interval: Duration,
    stats: ScannerStats,
}

impl<S> std::fmt::Debug for WindowExpiryScanner<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowExpiryScanner")
            .field("window_millis", &self.window_millis)
            .field("scan_interval", &self.scan_interval)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<S: BatchStore> WindowExpiryScanner<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: &BatchWindowConfig) -> Self {
        Self {
            store,
            clock,
            window_millis: i64::try_from(config.window_duration_ms).unwrap_or(i64::MAX),
            scan_interval: config.scan_interval(),
            stats: ScannerStats::default(),
        }
    }

    pub fn stats(&self) -> &ScannerStats {
        &self.stats
    }

    /// Promote every active batch whose window has elapsed
    ///
    /// Returns how many batches this call moved to the ready set. Errors on a
    /// single batch are logged and skipped; only failing to read the active set
    /// fails the scan.
    pub async fn scan(&self) -> StoreResult<usize> {
        let active = self.store.set_members(ACTIVE_BATCHES_KEY).await?;
        if active.is_empty() {
            return Ok(0);
        }

        let now = self.clock.now_millis();
        let mut promoted = 0;

        for member in &active {
            match self.evaluate(member, now).await {
                Ok(WindowState::Promoted) => promoted += 1,
                Ok(WindowState::Orphaned) => {
                    self.stats.orphans_dropped.fetch_add(1, Ordering::Relaxed);
                }
                Ok(WindowState::Open) => {}
                Err(e) => {
                    error!(batch_id = %member, error = %e, "Failed to evaluate batch window");
                }
            }
        }

        self.stats
            .batches_promoted
            .fetch_add(promoted as u64, Ordering::Relaxed);
        Ok(promoted)
    }

    async fn evaluate(&self, member: &str, now: i64) -> StoreResult<WindowState> {
        let batch_id = match BatchId::new(member) {
            Ok(batch_id) => batch_id,
            Err(e) => {
                warn!(batch_id = %member, error = %e, "Dropping malformed id from active batches");
                self.store.set_remove(ACTIVE_BATCHES_KEY, member).await?;
                return Ok(WindowState::Orphaned);
            }
        };

        let marker = self.store.get(&start_marker_key(&batch_id)).await?;
        let started_at = match marker.as_deref().map(str::parse::<i64>) {
            Some(Ok(started_at)) => started_at,
            Some(Err(_)) | None => {
                self.store.set_remove(ACTIVE_BATCHES_KEY, member).await?;
                warn!(
                    batch_id = %batch_id,
                    marker = ?marker,
                    "Active batch has no usable window start marker, dropping it"
                );
                return Ok(WindowState::Orphaned);
            }
        };

        let elapsed = now.saturating_sub(started_at);
        if elapsed < self.window_millis {
            return Ok(WindowState::Open);
        }

        let moved = self
            .store
            .set_move(ACTIVE_BATCHES_KEY, READY_BATCHES_KEY, member)
            .await?;
        if !moved {
            // Someone else promoted or dropped it since we listed the active set
            return Ok(WindowState::Open);
        }

        info!(
            batch_id = %batch_id,
            elapsed_ms = elapsed,
            "Batch window closed, ready for dispatch"
        );
        Ok(WindowState::Promoted)
    }

    /// Run scan cycles on the configured interval until shutdown is signalled
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.scan_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_ms = self.scan_interval.as_millis() as u64,
            window_ms = self.window_millis,
            "Starting window expiry scanner"
        );

        while !*shutdown.borrow() {
            tokio::select! {
                _ = ticker.tick() => self.run_cycle().await,
                _ = shutdown.changed() => break,
            }
        }

        info!(
            scan_cycles = self.stats.scan_cycles(),
            batches_promoted = self.stats.batches_promoted(),
            "Window expiry scanner stopped"
        );
    }

    async fn run_cycle(&self) {
        let start = Instant::now();
        self.stats.scan_cycles.fetch_add(1, Ordering::Relaxed);

        match self.scan().await {
            Ok(0) => debug!("No batch windows closed this cycle"),
            Ok(promoted) => info!(
                promoted = promoted,
                duration_ms = start.elapsed().as_millis() as u64,
                "Promoted batches with closed windows"
            ),
            Err(e) => {
                self.stats.failed_cycles.fetch_add(1, Ordering::Relaxed);
                error!(error = %e, "Window expiry scan failed");
            }
        }
    }
}
