//! Outbound documents published after a batch closes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Only a complete coordinate pair makes a point
    pub fn from_pair(lat: Option<f64>, lon: Option<f64>) -> Option<Self> {
        match (lat, lon) {
            (Some(lat), Some(lon)) => Some(Self { lat, lon }),
            _ => None,
        }
    }
}

/// Event ready for indexing
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDocument {
    pub global_event_id: i64,
    /// `YYYY-MM-DD`, selects the target index downstream
    #[serde(rename = "elasticIndexDate")]
    pub index_date: Option<String>,
    pub event_date: Option<DateTime<Utc>>,

    pub actor1_code: Option<String>,
    pub actor1_name: Option<String>,
    pub actor1_country_code: Option<String>,
    pub actor1_known_group_code: Option<String>,
    pub actor1_ethnic_code: Option<String>,
    pub actor1_religion1_code: Option<String>,
    pub actor1_religion2_code: Option<String>,
    pub actor1_type1_code: Option<String>,
    pub actor1_type2_code: Option<String>,
    pub actor1_type3_code: Option<String>,

    pub actor2_code: Option<String>,
    pub actor2_name: Option<String>,
    pub actor2_country_code: Option<String>,
    pub actor2_known_group_code: Option<String>,
    pub actor2_ethnic_code: Option<String>,
    pub actor2_religion1_code: Option<String>,
    pub actor2_religion2_code: Option<String>,
    pub actor2_type1_code: Option<String>,
    pub actor2_type2_code: Option<String>,
    pub actor2_type3_code: Option<String>,

    pub is_root_event: Option<i32>,
    pub event_code: Option<String>,
    pub event_base_code: Option<String>,
    pub event_root_code: Option<String>,
    pub quad_class: Option<i32>,
    pub goldstein_scale: Option<f64>,
    pub num_mentions: Option<i32>,
    pub num_sources: Option<i32>,
    pub num_articles: Option<i32>,
    pub avg_tone: Option<f64>,

    pub actor1_geo_type: Option<i32>,
    pub actor1_geo_full_name: Option<String>,
    pub actor1_geo_country_code: Option<String>,
    pub actor1_geo_adm1_code: Option<String>,
    pub actor1_geo_adm2_code: Option<String>,
    pub actor1_location: Option<GeoPoint>,
    pub actor1_geo_feature_id: Option<String>,

    pub actor2_geo_type: Option<i32>,
    pub actor2_geo_full_name: Option<String>,
    pub actor2_geo_country_code: Option<String>,
    pub actor2_geo_adm1_code: Option<String>,
    pub actor2_geo_adm2_code: Option<String>,
    pub actor2_location: Option<GeoPoint>,
    pub actor2_geo_feature_id: Option<String>,

    pub action_geo_type: Option<i32>,
    pub action_geo_full_name: Option<String>,
    pub action_geo_country_code: Option<String>,
    pub action_geo_adm1_code: Option<String>,
    pub action_geo_adm2_code: Option<String>,
    pub action_location: Option<GeoPoint>,
    pub action_geo_feature_id: Option<String>,

    pub date_added: Option<DateTime<Utc>>,
    pub source_url: Option<String>,
}

impl EventDocument {
    pub fn publish_key(&self) -> String {
        self.global_event_id.to_string()
    }
}

/// Mention ready for indexing
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionDocument {
    pub global_event_id: i64,
    #[serde(rename = "elasticIndexDate")]
    pub index_date: Option<String>,
    pub event_time_date: Option<DateTime<Utc>>,
    pub mention_time_date: Option<DateTime<Utc>>,
    pub mention_type: Option<i32>,
    pub mention_source_name: Option<String>,
    pub mention_identifier: String,
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

impl MentionDocument {
    /// Same composite as the staged mention's record id, so all mentions of
    /// one event land on one partition
    pub fn publish_key(&self) -> String {
        format!("{}_{}", self.global_event_id, self.mention_identifier)
    }
}
