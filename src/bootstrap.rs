//! # Coordinator Bootstrap
//!
//! Wires the batch components around one store, one clock and one publisher,
//! and runs the scanner and dispatcher loops as background tasks.
//!
//! Ingestion is driven from outside: the binary feeds the
//! [`RecordIngestor`] from Kafka, tests call it directly.

use crate::batch::{BatchRegistry, ReadyBatchDispatcher, RecordStager, WindowExpiryScanner};
use crate::clock::{Clock, SystemClock};
use crate::config::CoordinatorConfig;
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::ingest::RecordIngestor;
use crate::publish::{PublishCoordinator, RecordPublisher};
use crate::store::{BatchStore, StoreProvider};
use crate::transform::{BatchTransformer, DocumentTransformer};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// All coordinator components sharing one store
pub struct CoordinatorSystem<S> {
    config: CoordinatorConfig,
    clock: Arc<dyn Clock>,
    store: Arc<S>,
    registry: Arc<BatchRegistry<S>>,
    stager: Arc<RecordStager<S>>,
    ingestor: Arc<RecordIngestor<S>>,
    scanner: Arc<WindowExpiryScanner<S>>,
    dispatcher: Arc<ReadyBatchDispatcher<S>>,
}

impl<S> std::fmt::Debug for CoordinatorSystem<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinatorSystem")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

impl CoordinatorSystem<StoreProvider> {
    /// Build the store named by configuration on the system clock, with the
    /// default document mapping
    pub async fn from_config(
        config: CoordinatorConfig,
        publisher: Arc<dyn RecordPublisher>,
    ) -> CoordinatorResult<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let store = StoreProvider::from_config(&config.store, clock.clone()).await?;

        Ok(Self::new(
            Arc::new(store),
            clock,
            publisher,
            Arc::new(DocumentTransformer::new()),
            config,
        ))
    }
}

impl<S: BatchStore + 'static> CoordinatorSystem<S> {
    pub fn new(
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        publisher: Arc<dyn RecordPublisher>,
        transformer: Arc<dyn BatchTransformer>,
        config: CoordinatorConfig,
    ) -> Self {
        let registry = Arc::new(BatchRegistry::new(
            store.clone(),
            clock.clone(),
            &config.batch,
        ));
        let stager = Arc::new(RecordStager::new(store.clone(), &config.batch));
        let ingestor = Arc::new(RecordIngestor::new(
            registry.clone(),
            stager.clone(),
            &config.retry,
        ));
        let scanner = Arc::new(WindowExpiryScanner::new(
            store.clone(),
            clock.clone(),
            &config.batch,
        ));
        let dispatcher = Arc::new(ReadyBatchDispatcher::new(
            store.clone(),
            transformer,
            PublishCoordinator::new(publisher),
            &config.batch,
        ));

        info!(
            window_duration_ms = config.batch.window_duration_ms,
            grace_period_ms = config.batch.grace_period_ms,
            "Coordinator components initialized"
        );

        Self {
            config,
            clock,
            store,
            registry,
            stager,
            ingestor,
            scanner,
            dispatcher,
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn registry(&self) -> &Arc<BatchRegistry<S>> {
        &self.registry
    }

    pub fn stager(&self) -> &Arc<RecordStager<S>> {
        &self.stager
    }

    pub fn ingestor(&self) -> &Arc<RecordIngestor<S>> {
        &self.ingestor
    }

    pub fn scanner(&self) -> &Arc<WindowExpiryScanner<S>> {
        &self.scanner
    }

    pub fn dispatcher(&self) -> &Arc<ReadyBatchDispatcher<S>> {
        &self.dispatcher
    }

    /// Spawn the scanner and dispatcher loops
    ///
    /// Both loops stop at their next cycle boundary once the returned handle
    /// is stopped.
    pub fn start(&self) -> CoordinatorHandle {
        let (shutdown, receiver) = watch::channel(false);

        let scanner = self.scanner.clone();
        let scanner_shutdown = receiver.clone();
        let scanner_task = tokio::spawn(async move { scanner.run(scanner_shutdown).await });

        let dispatcher = self.dispatcher.clone();
        let dispatcher_task = tokio::spawn(async move { dispatcher.run(receiver).await });

        info!("Coordinator started");

        CoordinatorHandle {
            shutdown,
            tasks: vec![("scanner", scanner_task), ("dispatcher", dispatcher_task)],
        }
    }
}

/// Running coordinator loops
#[derive(Debug)]
pub struct CoordinatorHandle {
    shutdown: watch::Sender<bool>,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl CoordinatorHandle {
    pub fn is_running(&self) -> bool {
        !*self.shutdown.borrow()
    }

    /// A receiver that flips to `true` on stop, for loops run outside the handle
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// Signal shutdown and wait for every loop to finish its current cycle
    pub async fn stop(self) -> CoordinatorResult<()> {
        if self.shutdown.send_replace(true) {
            warn!("Coordinator already stopping");
        }
        info!("Coordinator shutdown requested");

        let mut failed = Vec::new();
        for (name, task) in self.tasks {
            if let Err(e) = task.await {
                error!(task = name, error = %e, "Coordinator task ended abnormally");
                failed.push(name);
            }
        }

        if failed.is_empty() {
            info!("Coordinator stopped");
            Ok(())
        } else {
            Err(CoordinatorError::Internal(format!(
                "Coordinator tasks ended abnormally: {}",
                failed.join(", ")
            )))
        }
    }
}
