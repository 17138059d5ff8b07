//! In-memory store backend

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::card::Card;
use crate::error::StorageResult;
use crate::store::{DeleteOutcome, InsertOutcome, KeyedStore};

/// In-memory card store
///
/// Thread-safe via `RwLock`; the write lock makes `insert_if_absent` atomic.
/// Not persistent: data is lost on drop.
#[derive(Default)]
pub struct InMemoryStore {
    cards: RwLock<HashMap<String, Card>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored cards
    pub fn len(&self) -> usize {
        self.cards
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total payload bytes stored
    pub fn total_size(&self) -> usize {
        self.cards
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(Card::size)
            .sum()
    }
}

#[async_trait]
impl KeyedStore for InMemoryStore {
    async fn probe(&self, key: &str) -> StorageResult<Option<Card>> {
        Ok(self
            .cards
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    async fn insert_if_absent(&self, card: Card) -> StorageResult<InsertOutcome> {
        let mut cards = self.cards.write().unwrap_or_else(PoisonError::into_inner);
        match cards.entry(card.digest.clone()) {
            Entry::Occupied(_) => Ok(InsertOutcome::AlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(card);
                Ok(InsertOutcome::Committed)
            }
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<DeleteOutcome> {
        let removed = self
            .cards
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(match removed {
            Some(_) => DeleteOutcome::Deleted,
            None => DeleteOutcome::NotFound,
        })
    }

    async fn list(&self, limit: Option<usize>, offset: usize) -> StorageResult<Vec<Card>> {
        let mut cards: Vec<Card> = self
            .cards
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        cards.sort_by(|a, b| {
            b.claimed_at
                .cmp(&a.claimed_at)
                .then_with(|| a.digest.cmp(&b.digest))
        });

        Ok(cards
            .into_iter()
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .collect())
    }

    async fn count(&self) -> StorageResult<usize> {
        Ok(self.len())
    }
}
