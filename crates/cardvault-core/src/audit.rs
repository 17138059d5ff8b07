//! Audit records: durable traces of duplicate and collision outcomes
//!
//! An audit record is stored as an ordinary card: its JSON serialization is
//! the payload and it gets its own digest under the active algorithm. The
//! card's metadata carries `{"audit": "<kind>"}` so readers can tell audit
//! cards from content.

use cardvault_storage::Card;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;

/// Metadata key marking a card as an audit record
pub const AUDIT_METADATA_KEY: &str = "audit";

/// Bytes compared when scoring a collision
pub const SIMILARITY_PREFIX: usize = 1024;

/// Identical bytes were submitted again
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateRecord {
    pub observed_digest: String,
    pub original_claimed_at: DateTime<Utc>,
    pub recorded_at: DateTime<Utc>,
    /// Bumped when this record's own serialization is already stored
    pub sequence: u32,
}

/// Two different byte sequences shared one digest
///
/// Every field is derived from the colliding pair, so callers that observe
/// the same collision serialize identical bytes and share one audit card.
/// The card's `claimed_at` records when it was first written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionRecord {
    pub original_digest: String,
    pub original_claimed_at: DateTime<Utc>,
    pub promoted_digest: String,
    pub old_algorithm: String,
    pub new_algorithm: String,
    /// Diagnostic only; see [`similarity_score`]
    pub similarity_score: f64,
    pub sequence: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditRecord {
    Duplicate(DuplicateRecord),
    Collision(CollisionRecord),
}

impl AuditRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            AuditRecord::Duplicate(_) => "duplicate",
            AuditRecord::Collision(_) => "collision",
        }
    }

    pub fn sequence(&self) -> u32 {
        match self {
            AuditRecord::Duplicate(r) => r.sequence,
            AuditRecord::Collision(r) => r.sequence,
        }
    }

    /// Change the serialization without changing the meaning
    pub fn bump_sequence(&mut self) {
        match self {
            AuditRecord::Duplicate(r) => r.sequence += 1,
            AuditRecord::Collision(r) => r.sequence += 1,
        }
    }

    /// Card metadata tagging the audit kind
    pub fn metadata(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert(AUDIT_METADATA_KEY.to_string(), self.kind().into());
        serde_json::Value::Object(map)
    }

    pub fn to_bytes(&self) -> CoreResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Decode an audit card; `None` for ordinary content cards
    pub fn from_card(card: &Card) -> Option<Self> {
        let tagged = card
            .metadata
            .as_ref()
            .is_some_and(|m| m.get(AUDIT_METADATA_KEY).is_some());
        if !tagged {
            return None;
        }
        Self::from_bytes(&card.bytes).ok()
    }

    pub fn as_duplicate(&self) -> Option<&DuplicateRecord> {
        match self {
            AuditRecord::Duplicate(r) => Some(r),
            AuditRecord::Collision(_) => None,
        }
    }

    pub fn as_collision(&self) -> Option<&CollisionRecord> {
        match self {
            AuditRecord::Collision(r) => Some(r),
            AuditRecord::Duplicate(_) => None,
        }
    }
}

/// Fraction of equal bytes at equal offsets over the first [`SIMILARITY_PREFIX`] bytes
///
/// The denominator is the longer of the two prefixes, so differing lengths
/// lower the score. Two empty inputs score 1.0.
pub fn similarity_score(a: &[u8], b: &[u8]) -> f64 {
    let a = &a[..a.len().min(SIMILARITY_PREFIX)];
    let b = &b[..b.len().min(SIMILARITY_PREFIX)];
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }
    let matching = a.iter().zip(b).filter(|(x, y)| x == y).count();
    matching as f64 / longest as f64
}
