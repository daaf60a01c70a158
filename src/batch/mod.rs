//! # Batch Lifecycle
//!
//! Every batch moves through the same states, each backed by store keys:
//!
//! ```text
//! register ──> active ──(window closes, scanner)──> ready ──(SPOP, dispatcher)──> claimed
//!                                                                                   │
//!                         cleaned <──(all publishes acknowledged)───────────────────┘
//! ```
//!
//! - [`registry`] opens a window the first time a batch id is seen
//! - [`stager`] writes records and membership under the batch's keys
//! - [`scanner`] promotes batches whose window has closed
//! - [`dispatcher`] claims ready batches and drives materialize, transform,
//!   publish and cleanup
//!
//! Every key carries a TTL of window + grace, so a batch abandoned in any
//! state disappears on its own.

pub mod cleaner;
pub mod dispatcher;
pub mod keys;
pub mod materializer;
pub mod registry;
pub mod scanner;
pub mod stager;

pub use cleaner::BatchCleaner;
pub use dispatcher::{DispatchOutcome, DispatcherStats, ReadyBatchDispatcher};
pub use materializer::{BatchMaterializer, MaterializedBatch};
pub use registry::BatchRegistry;
pub use scanner::{ScannerStats, WindowExpiryScanner};
pub use stager::{RecordStager, StageError};
