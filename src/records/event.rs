use super::{RecordKind, StagedRecord};
use serde::{Deserialize, Serialize};

/// Inbound event as produced by the upstream adapter
///
/// `day` is a `YYYYMMDD` integer and `date_added` a `YYYYMMDDHHMMSS` integer;
/// both are converted to timestamps by the transform step.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub global_event_id: i64,
    pub day: Option<i32>,

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
    pub actor1_geo_lat: Option<f64>,
    pub actor1_geo_long: Option<f64>,
    pub actor1_geo_feature_id: Option<String>,

    pub actor2_geo_type: Option<i32>,
    pub actor2_geo_full_name: Option<String>,
    pub actor2_geo_country_code: Option<String>,
    pub actor2_geo_adm1_code: Option<String>,
    pub actor2_geo_adm2_code: Option<String>,
    pub actor2_geo_lat: Option<f64>,
    pub actor2_geo_long: Option<f64>,
    pub actor2_geo_feature_id: Option<String>,

    pub action_geo_type: Option<i32>,
    pub action_geo_full_name: Option<String>,
    pub action_geo_country_code: Option<String>,
    pub action_geo_adm1_code: Option<String>,
    pub action_geo_adm2_code: Option<String>,
    pub action_geo_lat: Option<f64>,
    pub action_geo_long: Option<f64>,
    pub action_geo_feature_id: Option<String>,

    pub date_added: Option<i64>,
    pub source_url: Option<String>,
}

impl StagedRecord for Event {
    const KIND: RecordKind = RecordKind::Event;

    fn record_id(&self) -> String {
        self.global_event_id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_wire_names() {
        let event: Event = serde_json::from_str(
            r#"{"globalEventId": 1207, "day": 20250101, "actor1GeoLat": 55.75, "isRootEvent": 1}"#,
        )
        .unwrap();

        assert_eq!(event.global_event_id, 1207);
        assert_eq!(event.day, Some(20250101));
        assert_eq!(event.actor1_geo_lat, Some(55.75));
        assert_eq!(event.is_root_event, Some(1));
        assert_eq!(event.record_id(), "1207");
        assert_eq!(event.publish_key(), "1207");
    }

    #[test]
    fn test_missing_identifier_is_rejected() {
        assert!(serde_json::from_str::<Event>(r#"{"day": 20250101}"#).is_err());
    }
}
