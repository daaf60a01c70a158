//! # Transform
//!
//! Turns a materialized batch into the documents that get published. The
//! step sits between the materializer and the publish coordinator and cannot
//! fail: per-field problems degrade to `None` instead.
//!
//! [`DocumentTransformer`] is the default mapping. Mentions that reference
//! events outside the batch are passed through untouched.

pub mod dates;
mod documents;

pub use documents::DocumentTransformer;

use crate::batch::materializer::MaterializedBatch;
use crate::records::{BatchId, EventDocument, MentionDocument};

/// Documents ready for publishing
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedBatch {
    pub batch_id: BatchId,
    pub events: Vec<EventDocument>,
    pub mentions: Vec<MentionDocument>,
}

impl TransformedBatch {
    pub fn document_count(&self) -> usize {
        self.events.len() + self.mentions.len()
    }
}

/// Mapping applied to every claimed batch before publishing
pub trait BatchTransformer: Send + Sync {
    fn transform(&self, batch: MaterializedBatch) -> TransformedBatch;
}
