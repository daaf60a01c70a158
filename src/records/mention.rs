use super::{RecordKind, StagedRecord};
use serde::{Deserialize, Serialize};

/// Inbound mention of an event in a source document
///
/// Identified by the pair of the mentioned event id and the document
/// identifier; the same document may mention many events.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mention {
    pub global_event_id: i64,
    pub mention_identifier: String,
    /// `YYYYMMDDHHMMSS` of the event's first registration
    pub event_time_date: Option<i64>,
    /// `YYYYMMDDHHMMSS` of the update that produced this mention
    pub mention_time_date: Option<i64>,
    pub mention_type: Option<i32>,
    pub mention_source_name: Option<String>,
    pub sentence_id: Option<i32>,
    pub actor1_char_offset: Option<i32>,
    pub actor2_char_offset: Option<i32>,
    pub action_char_offset: Option<i32>,
    pub in_raw_text: Option<i32>,
    pub confidence: Option<i32>,
    pub mention_doc_len: Option<i32>,
    pub mention_doc_tone: Option<f64>,
    pub mention_doc_translation_info: Option<String>,
}

impl StagedRecord for Mention {
    const KIND: RecordKind = RecordKind::Mention;

    fn record_id(&self) -> String {
        format!("{}_{}", self.global_event_id, self.mention_identifier)
    }
}
