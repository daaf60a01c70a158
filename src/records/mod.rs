//! # Records
//!
//! Inbound records staged per batch ([`Event`], [`Mention`]), the documents
//! produced from them by the transform step, and the [`BatchId`] that ties
//! records to a window.
//!
//! Every inbound type implements [`StagedRecord`], which is all the key
//! schema, stager and materializer need to know about a record.

mod batch_id;
mod document;
mod event;
mod mention;

pub use batch_id::{BatchId, InvalidBatchId};
pub use document::{EventDocument, GeoPoint, MentionDocument};
pub use event::Event;
pub use mention::Mention;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// The two record streams a batch accumulates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Event,
    Mention,
}

impl RecordKind {
    pub const ALL: [RecordKind; 2] = [RecordKind::Event, RecordKind::Mention];

    /// Segment used in per-record data keys (`data:{segment}:...`)
    pub fn data_segment(self) -> &'static str {
        match self {
            RecordKind::Event => "event",
            RecordKind::Mention => "mention",
        }
    }

    /// Segment used in membership set keys (`batch:{segment}:...`)
    pub fn membership_segment(self) -> &'static str {
        match self {
            RecordKind::Event => "events",
            RecordKind::Mention => "mentions",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.data_segment())
    }
}

/// A record that can be staged against a batch
pub trait StagedRecord: Serialize + DeserializeOwned + Send + Sync {
    const KIND: RecordKind;

    /// Identifier unique within the record's kind and batch
    fn record_id(&self) -> String;

    /// Key used when publishing the transformed record
    fn publish_key(&self) -> String {
        self.record_id()
    }
}
