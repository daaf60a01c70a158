//! # Shared State Store
//!
//! The coordinator keeps every piece of batch state in an external key-value
//! store with per-key expiry and set operations.
//!
//! ```text
//! StoreProvider (enum)              <- selected by `store.backend`
//!   ├── Redis(RedisBatchStore)      <- ConnectionManager, SPOP claim, SET NX PX marker
//!   └── InMemory(InMemoryBatchStore) <- single mutex, clock-driven TTL
//! ```
//!
//! Batch components are generic over [`BatchStore`], so tests can run them
//! against the in-memory backend or a fault-injecting wrapper.

pub mod errors;
pub mod provider;
pub mod providers;
pub mod traits;

pub use errors::{StoreError, StoreResult};
pub use provider::StoreProvider;
pub use providers::{InMemoryBatchStore, RedisBatchStore};
pub use traits::BatchStore;
