#![allow(clippy::doc_markdown)] // Allow technical terms like SPOP, SMOVE in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Windowed Batcher
//!
//! Micro-batching coordinator for streams of GDELT-style events and mentions.
//!
//! ## Overview
//!
//! Producers tag every record with a batch id. The coordinator groups records
//! by that id over a fixed time window, then hands each closed batch to
//! exactly one dispatcher, which transforms the records into documents and
//! publishes them. All coordination state lives in a shared key-value store,
//! so any number of coordinator processes can run side by side.
//!
//! ## Architecture
//!
//! ```text
//! Kafka in ─> RecordIngestor ─> BatchRegistry + RecordStager ─┐
//!                                                              v
//!                                                   store (active:batches)
//!                                                              │ WindowExpiryScanner
//!                                                              v
//!                                                   store (ready:batches)
//!                                                              │ ReadyBatchDispatcher
//!                                                              v
//!                        materialize ─> transform ─> publish ─> cleanup ─> Kafka out
//! ```
//!
//! ## Module Organization
//!
//! - [`batch`] - Batch lifecycle: keys, registry, staging, scanning, dispatch
//! - [`bootstrap`] - Component wiring and background loop lifecycle
//! - [`clock`] - Injectable millisecond clock
//! - [`config`] - Layered configuration
//! - [`error`] - Top-level error type
//! - [`ingest`] - Inbound record handling with retry
//! - [`logging`] - Structured logging setup
//! - [`publish`] - Outbound publishing fan-out and backends
//! - [`records`] - Record, document and batch id types
//! - [`store`] - Shared store abstraction and backends
//! - [`transform`] - Record to document mapping
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use windowed_batcher::bootstrap::CoordinatorSystem;
//! use windowed_batcher::clock::SystemClock;
//! use windowed_batcher::config::CoordinatorConfig;
//! use windowed_batcher::publish::InMemoryPublisher;
//! use windowed_batcher::records::{BatchId, Event};
//! use windowed_batcher::store::InMemoryBatchStore;
//! use windowed_batcher::transform::DocumentTransformer;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let clock = Arc::new(SystemClock);
//! let system = CoordinatorSystem::new(
//!     Arc::new(InMemoryBatchStore::new(clock.clone())),
//!     clock,
//!     Arc::new(InMemoryPublisher::new()),
//!     Arc::new(DocumentTransformer::new()),
//!     CoordinatorConfig::default(),
//! );
//!
//! let handle = system.start();
//! let batch = BatchId::new("20240101-0001")?;
//! system
//!     .ingestor()
//!     .ingest_event(&batch, &Event { global_event_id: 1, ..Event::default() })
//!     .await;
//! handle.stop().await?;
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod bootstrap;
pub mod clock;
pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod publish;
pub mod records;
pub mod store;
pub mod transform;

pub use bootstrap::{CoordinatorHandle, CoordinatorSystem};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CoordinatorConfig;
pub use error::{CoordinatorError, CoordinatorResult};
pub use records::{BatchId, Event, Mention, RecordKind};
pub use store::{BatchStore, StoreProvider};
