use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Why a string cannot be used as a batch id
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidBatchId {
    #[error("batch id must not be empty")]
    Empty,
    #[error("batch id '{0}' must not contain ':'")]
    ContainsSeparator(String),
}

/// Opaque batch identifier, usually a time-bucket label
///
/// Never empty and never contains `:`, the key segment separator, so every
/// store key built from it splits back into exactly one batch id.
///
/// Producers that do send a `:` in the batch header get every record of that
/// batch dropped at ingest, logged at error level with the raw id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BatchId(String);

impl BatchId {
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidBatchId> {
        let id = id.into();
        if id.is_empty() {
            return Err(InvalidBatchId::Empty);
        }
        if id.contains(':') {
            return Err(InvalidBatchId::ContainsSeparator(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BatchId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for BatchId {
    type Err = InvalidBatchId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for BatchId {
    type Error = InvalidBatchId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BatchId> for String {
    fn from(id: BatchId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_time_bucket_labels() {
        let id = BatchId::new("20250101-1215").unwrap();
        assert_eq!(id.as_str(), "20250101-1215");
        assert_eq!(id.to_string(), "20250101-1215");
    }

    #[test]
    fn test_rejects_empty_and_separator() {
        assert_eq!(BatchId::new(""), Err(InvalidBatchId::Empty));
        assert!(matches!(
            "a:b".parse::<BatchId>(),
            Err(InvalidBatchId::ContainsSeparator(_))
        ));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: BatchId = serde_json::from_str("\"B1\"").unwrap();
        assert_eq!(ok.as_str(), "B1");
        assert!(serde_json::from_str::<BatchId>("\"B:1\"").is_err());
    }
}
