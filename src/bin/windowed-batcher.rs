//! # Windowed Batcher
//!
//! Standalone coordinator: consumes events and mentions from Kafka, windows
//! them in the configured store and publishes each closed batch back to Kafka.
//!
//! ## Usage
//!
//! ```bash
//! # Defaults plus config/windowed-batcher.toml when present
//! cargo run --bin windowed-batcher --features kafka
//!
//! # Explicit file and an override
//! WINDOWED_BATCHER_CONFIG_PATH=/etc/batcher.toml \
//! WINDOWED_BATCHER__BATCH__WINDOW_DURATION_MS=30000 \
//!     cargo run --bin windowed-batcher --features kafka
//! ```

use anyhow::Context;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use windowed_batcher::bootstrap::CoordinatorSystem;
use windowed_batcher::config::load_config;
use windowed_batcher::ingest::kafka::{provision_dead_letter_topics, KafkaIngestLoop};
use windowed_batcher::logging::init_structured_logging;
use windowed_batcher::publish::KafkaPublisher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("Failed to load configuration")?;
    init_structured_logging(&config.logging);

    info!("🚀 Starting windowed batcher...");
    info!("   Version: {}", env!("CARGO_PKG_VERSION"));

    provision_dead_letter_topics(&config.kafka)
        .await
        .context("Failed to provision dead-letter topics")?;

    let publisher = KafkaPublisher::from_config(&config.kafka)
        .context("Failed to create Kafka publisher")?;

    let system = CoordinatorSystem::from_config(config.clone(), Arc::new(publisher))
        .await
        .context("Failed to bootstrap coordinator")?;

    let ingest = Arc::new(
        KafkaIngestLoop::from_config(&config.kafka, system.ingestor().clone())
            .context("Failed to start Kafka ingest")?,
    );

    let handle = system.start();
    let ingest_shutdown = handle.shutdown_receiver();
    let ingest_task = tokio::spawn(async move { ingest.run(ingest_shutdown).await });

    info!("🎉 Windowed batcher started");
    info!("   Press Ctrl+C to shutdown gracefully");

    shutdown_signal().await;

    info!("🛑 Shutdown signal received, initiating graceful shutdown...");

    if let Err(e) = handle.stop().await {
        error!("Failed to stop coordinator cleanly: {}", e);
    }
    if let Err(e) = ingest_task.await {
        error!("Kafka ingest task ended abnormally: {}", e);
    }

    let ingest_stats = system.ingestor().stats();
    let dispatch_stats = system.dispatcher().stats();
    info!(
        records_staged = ingest_stats.records_staged(),
        records_skipped = ingest_stats.records_skipped(),
        batches_promoted = system.scanner().stats().batches_promoted(),
        batches_published = dispatch_stats.batches_published(),
        batches_failed = dispatch_stats.batches_failed(),
        "👋 Windowed batcher shutdown complete"
    );

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received SIGTERM");
        },
    }
}
