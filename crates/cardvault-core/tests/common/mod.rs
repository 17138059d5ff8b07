//! Shared fixtures for provisioning tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Barrier;
use cardvault_core::{
    AuditRecord, BuiltinDigest, DigestAlgorithm, DigestEngine, EscalationLadder, PluggableDigest,
    ProvisioningEngine, RecordingSleeper, RetryPolicy,
};
use cardvault_storage::{
    Card, DeleteOutcome, InMemoryStore, InsertOutcome, KeyedStore, StorageError, StorageResult,
};

pub const X: &[u8] = b"the quick brown fox";
pub const Y: &[u8] = b"the quick brown cat";
pub const FORCED_MD5: &str = "00000000000000000000000000000000";

/// An "md5" rung that maps both `X` and `Y` to `FORCED_MD5`
pub fn colliding_md5() -> Arc<dyn DigestEngine> {
    forced("md5", DigestAlgorithm::Md5, &[X, Y], FORCED_MD5)
}

/// Named stub rung: `colliding` inputs hash to `target`, everything else uses `real`
pub fn forced(
    name: &str,
    real: DigestAlgorithm,
    colliding: &[&'static [u8]],
    target: &'static str,
) -> Arc<dyn DigestEngine> {
    let colliding: Vec<&'static [u8]> = colliding.to_vec();
    let real = BuiltinDigest::new(real);
    let engine = PluggableDigest::from_fn(name, real.output_length(), move |bytes| {
        if colliding.iter().any(|c| *c == bytes) {
            target.to_string()
        } else {
            real.hash_hex(bytes)
        }
    })
    .unwrap();
    Arc::new(engine)
}

/// An "md5" rung sending audit payloads matching `matches` to `target`
pub fn audit_forced(matches: fn(&str) -> bool, target: &'static str) -> Arc<dyn DigestEngine> {
    let real = BuiltinDigest::new(DigestAlgorithm::Md5);
    let engine = PluggableDigest::from_fn("md5", 32, move |bytes| match std::str::from_utf8(bytes) {
        Ok(text) if matches(text) => target.to_string(),
        _ => real.hash_hex(bytes),
    })
    .unwrap();
    Arc::new(engine)
}

pub fn builtin(alg: DigestAlgorithm) -> Arc<dyn DigestEngine> {
    Arc::new(BuiltinDigest::new(alg))
}

/// `[stub md5, sha1, sha256, sha512, blake3]` at the bottom rung
pub fn colliding_ladder() -> EscalationLadder {
    EscalationLadder::new(
        vec![
            colliding_md5(),
            builtin(DigestAlgorithm::Sha1),
            builtin(DigestAlgorithm::Sha256),
            builtin(DigestAlgorithm::Sha512),
            builtin(DigestAlgorithm::Blake3),
        ],
        0,
    )
    .unwrap()
}

pub fn engine_with(
    store: Arc<dyn KeyedStore>,
    ladder: EscalationLadder,
    sleeper: Arc<RecordingSleeper>,
) -> ProvisioningEngine {
    ProvisioningEngine::builder(store)
        .ladder(ladder)
        .retry_policy(RetryPolicy::new(3, Duration::from_millis(10)))
        .sleeper(sleeper)
        .build()
}

pub fn audits(cards: &[Card]) -> Vec<AuditRecord> {
    cards.iter().filter_map(AuditRecord::from_card).collect()
}

/// In-memory store that reports `Busy` a fixed number of times per operation
#[derive(Default)]
pub struct FlakyStore {
    pub inner: InMemoryStore,
    insert_busy: AtomicU32,
    probe_busy: AtomicU32,
    pub insert_calls: AtomicU32,
}

impl FlakyStore {
    pub fn new(insert_busy: u32, probe_busy: u32) -> Self {
        Self {
            inner: InMemoryStore::new(),
            insert_busy: AtomicU32::new(insert_busy),
            probe_busy: AtomicU32::new(probe_busy),
            insert_calls: AtomicU32::new(0),
        }
    }

}

fn take(counter: &AtomicU32) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[async_trait]
impl KeyedStore for FlakyStore {
    async fn probe(&self, key: &str) -> StorageResult<Option<Card>> {
        if take(&self.probe_busy) {
            return Err(StorageError::Busy);
        }
        self.inner.probe(key).await
    }

    async fn insert_if_absent(&self, card: Card) -> StorageResult<InsertOutcome> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if take(&self.insert_busy) {
            return Ok(InsertOutcome::Busy);
        }
        self.inner.insert_if_absent(card).await
    }

    async fn delete(&self, key: &str) -> StorageResult<DeleteOutcome> {
        self.inner.delete(key).await
    }

    async fn list(&self, limit: Option<usize>, offset: usize) -> StorageResult<Vec<Card>> {
        self.inner.list(limit, offset).await
    }

    async fn count(&self) -> StorageResult<usize> {
        self.inner.count().await
    }
}

/// In-memory store whose first `racers` probes of `key` all return before any
/// caller moves on, so every racer observes the same stored card
pub struct GatedStore {
    pub inner: InMemoryStore,
    key: String,
    remaining: AtomicU32,
    gate: Barrier,
}

impl GatedStore {
    pub fn new(key: &str, racers: usize) -> Self {
        Self {
            inner: InMemoryStore::new(),
            key: key.to_string(),
            remaining: AtomicU32::new(racers as u32),
            gate: Barrier::new(racers),
        }
    }
}

#[async_trait]
impl KeyedStore for GatedStore {
    async fn probe(&self, key: &str) -> StorageResult<Option<Card>> {
        let found = self.inner.probe(key).await;
        if key == self.key && take(&self.remaining) {
            self.gate.wait().await;
        }
        found
    }

    async fn insert_if_absent(&self, card: Card) -> StorageResult<InsertOutcome> {
        self.inner.insert_if_absent(card).await
    }

    async fn delete(&self, key: &str) -> StorageResult<DeleteOutcome> {
        self.inner.delete(key).await
    }

    async fn list(&self, limit: Option<usize>, offset: usize) -> StorageResult<Vec<Card>> {
        self.inner.list(limit, offset).await
    }

    async fn count(&self) -> StorageResult<usize> {
        self.inner.count().await
    }
}
