use super::dates::{
    compact_timestamp_to_datetime, compact_timestamp_to_index_date, day_to_datetime,
    day_to_index_date,
};
use super::{BatchTransformer, TransformedBatch};
use crate::batch::materializer::MaterializedBatch;
use crate::records::{Event, EventDocument, GeoPoint, Mention, MentionDocument};

/// Maps events and mentions field by field into their indexed documents
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentTransformer;

impl DocumentTransformer {
    pub fn new() -> Self {
        Self
    }

    pub fn event_document(&self, event: Event) -> EventDocument {
        EventDocument {
            global_event_id: event.global_event_id,
            index_date: event.day.and_then(|day| day_to_index_date(day, "day")),
            event_date: event.day.and_then(|day| day_to_datetime(day, "day")),

            actor1_code: event.actor1_code,
            actor1_name: event.actor1_name,
            actor1_country_code: event.actor1_country_code,
            actor1_known_group_code: event.actor1_known_group_code,
            actor1_ethnic_code: event.actor1_ethnic_code,
            actor1_religion1_code: event.actor1_religion1_code,
            actor1_religion2_code: event.actor1_religion2_code,
            actor1_type1_code: event.actor1_type1_code,
            actor1_type2_code: event.actor1_type2_code,
            actor1_type3_code: event.actor1_type3_code,

            actor2_code: event.actor2_code,
            actor2_name: event.actor2_name,
            actor2_country_code: event.actor2_country_code,
            actor2_known_group_code: event.actor2_known_group_code,
            actor2_ethnic_code: event.actor2_ethnic_code,
            actor2_religion1_code: event.actor2_religion1_code,
            actor2_religion2_code: event.actor2_religion2_code,
            actor2_type1_code: event.actor2_type1_code,
            actor2_type2_code: event.actor2_type2_code,
            actor2_type3_code: event.actor2_type3_code,

            is_root_event: event.is_root_event,
            event_code: event.event_code,
            event_base_code: event.event_base_code,
            event_root_code: event.event_root_code,
            quad_class: event.quad_class,
            goldstein_scale: event.goldstein_scale,
            num_mentions: event.num_mentions,
            num_sources: event.num_sources,
            num_articles: event.num_articles,
            avg_tone: event.avg_tone,

            actor1_geo_type: event.actor1_geo_type,
            actor1_geo_full_name: event.actor1_geo_full_name,
            actor1_geo_country_code: event.actor1_geo_country_code,
            actor1_geo_adm1_code: event.actor1_geo_adm1_code,
            actor1_geo_adm2_code: event.actor1_geo_adm2_code,
            actor1_location: GeoPoint::from_pair(event.actor1_geo_lat, event.actor1_geo_long),
            actor1_geo_feature_id: event.actor1_geo_feature_id,

            actor2_geo_type: event.actor2_geo_type,
            actor2_geo_full_name: event.actor2_geo_full_name,
            actor2_geo_country_code: event.actor2_geo_country_code,
            actor2_geo_adm1_code: event.actor2_geo_adm1_code,
            actor2_geo_adm2_code: event.actor2_geo_adm2_code,
            actor2_location: GeoPoint::from_pair(event.actor2_geo_lat, event.actor2_geo_long),
            actor2_geo_feature_id: event.actor2_geo_feature_id,

            action_geo_type: event.action_geo_type,
            action_geo_full_name: event.action_geo_full_name,
            action_geo_country_code: event.action_geo_country_code,
            action_geo_adm1_code: event.action_geo_adm1_code,
            action_geo_adm2_code: event.action_geo_adm2_code,
            action_location: GeoPoint::from_pair(event.action_geo_lat, event.action_geo_long),
            action_geo_feature_id: event.action_geo_feature_id,

            date_added: event
                .date_added
                .and_then(|ts| compact_timestamp_to_datetime(ts, "dateAdded")),
            source_url: event.source_url,
        }
    }

    pub fn mention_document(&self, mention: Mention) -> MentionDocument {
        MentionDocument {
            global_event_id: mention.global_event_id,
            index_date: mention
                .mention_time_date
                .and_then(|ts| compact_timestamp_to_index_date(ts, "mentionTimeDate")),
            event_time_date: mention
                .event_time_date
                .and_then(|ts| compact_timestamp_to_datetime(ts, "eventTimeDate")),
            mention_time_date: mention
                .mention_time_date
                .and_then(|ts| compact_timestamp_to_datetime(ts, "mentionTimeDate")),
            mention_type: mention.mention_type,
            mention_source_name: mention.mention_source_name,
            mention_identifier: mention.mention_identifier,
            sentence_id: mention.sentence_id,
            actor1_char_offset: mention.actor1_char_offset,
            actor2_char_offset: mention.actor2_char_offset,
            action_char_offset: mention.action_char_offset,
            in_raw_text: mention.in_raw_text,
            confidence: mention.confidence,
            mention_doc_len: mention.mention_doc_len,
            mention_doc_tone: mention.mention_doc_tone,
            mention_doc_translation_info: mention.mention_doc_translation_info,
        }
    }
}

impl BatchTransformer for DocumentTransformer {
    fn transform(&self, batch: MaterializedBatch) -> TransformedBatch {
        TransformedBatch {
            batch_id: batch.batch_id,
            events: batch
                .events
                .into_iter()
                .map(|event| self.event_document(event))
                .collect(),
            mentions: batch
                .mentions
                .into_iter()
                .map(|mention| self.mention_document(mention))
                .collect(),
        }
    }
}
