//! Store key schema
//!
//! ```text
//! data:event:{batchId}:{eventId}        staged event
//! data:mention:{batchId}:{mentionId}    staged mention
//! batch:events:{batchId}                event id membership set
//! batch:mentions:{batchId}              mention id membership set
//! batch:start:{batchId}                 window start marker (epoch millis)
//! active:batches                        batches with an open window
//! ready:batches                         batches waiting to be claimed
//! ```
//!
//! Batch ids never contain `:`, so a data key splits back into exactly one
//! `(kind, batch id, record id)` triple even when the record id does.

use crate::records::{BatchId, RecordKind};

pub const ACTIVE_BATCHES_KEY: &str = "active:batches";
pub const READY_BATCHES_KEY: &str = "ready:batches";

pub fn data_key(kind: RecordKind, batch_id: &BatchId, record_id: &str) -> String {
    format!("data:{}:{}:{}", kind.data_segment(), batch_id, record_id)
}

pub fn membership_key(kind: RecordKind, batch_id: &BatchId) -> String {
    format!("batch:{}:{}", kind.membership_segment(), batch_id)
}

pub fn start_marker_key(batch_id: &BatchId) -> String {
    format!("batch:start:{}", batch_id)
}
