//! Keyed durable store contract

use async_trait::async_trait;

use crate::card::Card;
use crate::error::StorageResult;

/// Result of an atomic put-if-absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// This call created the record
    Committed,
    /// A record already lives under the key; nothing was written
    AlreadyExists,
    /// Transient contention; nothing was written, the caller may retry
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Digest-keyed durable card storage
///
/// `insert_if_absent` is the only serialization point: concurrent calls on
/// the same key never both return `Committed`. Read-side contention is
/// reported as `StorageError::Busy`.
#[async_trait]
pub trait KeyedStore: Send + Sync {
    /// Look up a card by key
    async fn probe(&self, key: &str) -> StorageResult<Option<Card>>;

    /// Store a card under `card.digest` unless the key is taken
    async fn insert_if_absent(&self, card: Card) -> StorageResult<InsertOutcome>;

    /// Remove a card
    async fn delete(&self, key: &str) -> StorageResult<DeleteOutcome>;

    /// Cards ordered by `claimed_at` descending, ties by digest ascending
    ///
    /// `limit = None` returns everything after `offset`.
    async fn list(&self, limit: Option<usize>, offset: usize) -> StorageResult<Vec<Card>>;

    /// Number of stored cards
    async fn count(&self) -> StorageResult<usize>;
}
