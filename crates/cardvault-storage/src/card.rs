//! The persisted card record

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{StorageError, StorageResult};

/// One immutable content record, keyed by its digest
///
/// Logical row shape: `(digest TEXT UNIQUE, bytes BLOB, claimed_at TEXT)`,
/// plus optional free-form metadata the store never interprets.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub digest: String,
    pub bytes: Vec<u8>,
    pub claimed_at: DateTime<Utc>,
    pub metadata: Option<serde_json::Value>,
}

impl Card {
    pub fn new(digest: impl Into<String>, bytes: Vec<u8>, claimed_at: DateTime<Utc>) -> Self {
        Self {
            digest: digest.into(),
            bytes,
            claimed_at,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Fixed-width RFC 3339 (microseconds, `Z` suffix) so text ordering matches time ordering
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse an RFC 3339 timestamp with any offset into UTC
pub fn parse_timestamp(s: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StorageError::InvalidTimestamp(format!("{s}: {e}")))
}
