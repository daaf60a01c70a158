//! Compact numeric date formats used by inbound records
//!
//! - day: `YYYYMMDD` (e.g. `20250101`)
//! - timestamp: `YYYYMMDDHHMMSS` in UTC (e.g. `20250101121500`)
//!
//! Anything malformed yields `None` with a warning; dates never fail a batch.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::warn;

const DAY_FORMAT: &str = "%Y%m%d";
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const INDEX_DATE_FORMAT: &str = "%Y-%m-%d";

fn parse_day_digits(digits: &str) -> Option<NaiveDate> {
    if digits.len() != 8 {
        return None;
    }
    NaiveDate::parse_from_str(digits, DAY_FORMAT).ok()
}

/// `20250101` -> `2025-01-01T00:00:00Z`
pub fn day_to_datetime(day: i32, field: &str) -> Option<DateTime<Utc>> {
    let midnight = parse_day_digits(&day.to_string()).and_then(|date| date.and_hms_opt(0, 0, 0));
    match midnight {
        Some(naive) => Some(naive.and_utc()),
        None => {
            warn!(field = field, value = day, "Invalid YYYYMMDD day value");
            None
        }
    }
}

/// `20250101` -> `"2025-01-01"`
pub fn day_to_index_date(day: i32, field: &str) -> Option<String> {
    match parse_day_digits(&day.to_string()) {
        Some(date) => Some(date.format(INDEX_DATE_FORMAT).to_string()),
        None => {
            warn!(field = field, value = day, "Invalid YYYYMMDD day value for index date");
            None
        }
    }
}

/// `20250101121500` -> `2025-01-01T12:15:00Z`
pub fn compact_timestamp_to_datetime(timestamp: i64, field: &str) -> Option<DateTime<Utc>> {
    let digits = timestamp.to_string();
    let parsed = (digits.len() == 14)
        .then(|| NaiveDateTime::parse_from_str(&digits, TIMESTAMP_FORMAT).ok())
        .flatten();

    match parsed {
        Some(naive) => Some(naive.and_utc()),
        None => {
            warn!(field = field, value = timestamp, "Invalid YYYYMMDDHHMMSS timestamp");
            None
        }
    }
}

/// Date part of a compact timestamp: `20250101121500` -> `"2025-01-01"`
///
/// Only the leading eight digits are read, so a bare `YYYYMMDD` works too.
pub fn compact_timestamp_to_index_date(timestamp: i64, field: &str) -> Option<String> {
    let digits = timestamp.to_string();
    let date = digits.get(..8).and_then(parse_day_digits);

    match date {
        Some(date) => Some(date.format(INDEX_DATE_FORMAT).to_string()),
        None => {
            warn!(
                field = field,
                value = timestamp,
                "Timestamp too short or invalid for index date"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_day_conversions() {
        assert_eq!(
            day_to_datetime(20210101, "day"),
            Some(Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(day_to_index_date(20210101, "day").as_deref(), Some("2021-01-01"));
    }

    #[test]
    fn test_day_rejects_wrong_length_and_impossible_dates() {
        assert_eq!(day_to_datetime(2021011, "day"), None);
        assert_eq!(day_to_datetime(20211341, "day"), None);
        assert_eq!(day_to_index_date(-20210101, "day"), None);
    }

    #[test]
    fn test_compact_timestamp() {
        assert_eq!(
            compact_timestamp_to_datetime(20210101123456, "dateAdded"),
            Some(Utc.with_ymd_and_hms(2021, 1, 1, 12, 34, 56).unwrap())
        );
        assert_eq!(compact_timestamp_to_datetime(202101011234, "dateAdded"), None);
        assert_eq!(compact_timestamp_to_datetime(20210101126000, "dateAdded"), None);
    }

    #[test]
    fn test_index_date_from_timestamp_needs_eight_digits() {
        assert_eq!(
            compact_timestamp_to_index_date(20210101123456, "mentionTimeDate").as_deref(),
            Some("2021-01-01")
        );
        assert_eq!(
            compact_timestamp_to_index_date(20210101, "mentionTimeDate").as_deref(),
            Some("2021-01-01")
        );
        assert_eq!(compact_timestamp_to_index_date(2021010, "mentionTimeDate"), None);
    }
}
