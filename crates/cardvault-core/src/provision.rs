//! Provisioning engine: digest, classify, escalate, audit, commit
//!
//! ```text
//! START → DIGESTED → probe ─┬─ absent  → insert ─┬─ Committed     → DONE
//!                           │                    └─ AlreadyExists → probe again
//!                           ├─ same bytes → DuplicateRecord → DONE
//!                           └─ different  → promote → CollisionRecord
//!                                           → probe at promoted digest (loop)
//! ```
//!
//! `insert_if_absent` is the only serialization point against the store.
//! The escalation state has its own mutex, held only for read → promote →
//! swap. Commits are never undone.

use std::sync::Arc;

use cardvault_storage::{Card, DeleteOutcome, InsertOutcome, KeyedStore, StorageError};

use crate::audit::{
    AUDIT_METADATA_KEY, AuditRecord, CollisionRecord, DuplicateRecord, similarity_score,
};
use crate::clock::MonotonicClock;
use crate::error::{CoreError, CoreResult};
use crate::escalation::EscalationState;
use crate::ladder::EscalationLadder;
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper, retry_busy};

/// Default upper bound on content size (16 MiB)
pub const DEFAULT_MAX_CONTENT_SIZE: usize = 16 * 1024 * 1024;

/// Serializations tried for one audit record before giving up
pub const MAX_AUDIT_ATTEMPTS: u32 = 16;

/// Orchestrates card creation against a [`KeyedStore`]
///
/// Safe to share across tasks (`Arc<ProvisioningEngine>`); every await point
/// is a store call.
pub struct ProvisioningEngine {
    store: Arc<dyn KeyedStore>,
    escalation: Arc<EscalationState>,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    max_content_size: usize,
    clock: MonotonicClock,
}

pub struct ProvisioningEngineBuilder {
    store: Arc<dyn KeyedStore>,
    escalation: Option<Arc<EscalationState>>,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    max_content_size: usize,
}

impl ProvisioningEngineBuilder {
    /// Start from this ladder (ignored if `escalation_state` is set)
    pub fn ladder(mut self, ladder: EscalationLadder) -> Self {
        self.escalation = Some(Arc::new(EscalationState::new(ladder)));
        self
    }

    /// Share an existing escalation state
    pub fn escalation_state(mut self, state: Arc<EscalationState>) -> Self {
        self.escalation = Some(state);
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn max_content_size(mut self, max: usize) -> Self {
        self.max_content_size = max;
        self
    }

    pub fn build(self) -> ProvisioningEngine {
        ProvisioningEngine {
            store: self.store,
            escalation: self.escalation.unwrap_or_default(),
            retry: self.retry,
            sleeper: self.sleeper,
            max_content_size: self.max_content_size,
            clock: MonotonicClock::new(),
        }
    }
}

impl ProvisioningEngine {
    pub fn builder(store: Arc<dyn KeyedStore>) -> ProvisioningEngineBuilder {
        ProvisioningEngineBuilder {
            store,
            escalation: None,
            retry: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
            max_content_size: DEFAULT_MAX_CONTENT_SIZE,
        }
    }

    /// Engine with default policy over the standard ladder
    pub fn new(store: Arc<dyn KeyedStore>) -> Self {
        Self::builder(store).build()
    }

    pub fn escalation_state(&self) -> &Arc<EscalationState> {
        &self.escalation
    }

    /// Name of the algorithm new content is digested with
    pub fn current_algorithm(&self) -> String {
        self.escalation.current().algorithm_name().to_string()
    }

    pub fn max_content_size(&self) -> usize {
        self.max_content_size
    }

    /// Store `content`, returning exactly one card
    ///
    /// A fresh write returns the content card. A duplicate returns the
    /// `DuplicateRecord` card. A collision returns the content card at the
    /// promoted digest, after its `CollisionRecord` has been committed.
    pub async fn create(&self, content: &[u8]) -> CoreResult<Card> {
        self.create_with_metadata(content, None).await
    }

    /// As [`create`](Self::create); `metadata` is attached to a newly written content card only
    ///
    /// The `"audit"` key is reserved for audit cards and rejected here.
    pub async fn create_with_metadata(
        &self,
        content: &[u8],
        metadata: Option<serde_json::Value>,
    ) -> CoreResult<Card> {
        self.check_content(content)?;
        if metadata
            .as_ref()
            .is_some_and(|m| m.get(AUDIT_METADATA_KEY).is_some())
        {
            return Err(CoreError::ReservedMetadataKey(AUDIT_METADATA_KEY));
        }

        let mut ladder = self.escalation.current();
        let mut digest = ladder.current().digest(content)?;

        loop {
            match self.probe(&digest).await? {
                None => {
                    let card = Card {
                        digest: digest.clone(),
                        bytes: content.to_vec(),
                        claimed_at: self.clock.now(),
                        metadata: metadata.clone(),
                    };
                    if let Some(card) = self.insert(card).await? {
                        tracing::debug!(
                            digest = %card.digest,
                            algorithm = ladder.algorithm_name(),
                            size = card.size(),
                            "card committed"
                        );
                        return Ok(card);
                    }
                    tracing::debug!(%digest, "lost insert race, re-probing");
                }
                Some(existing) if existing.bytes == content => {
                    return self.record_duplicate(&existing).await;
                }
                Some(existing) => {
                    let promoted = self
                        .escalation
                        .escalate_from(&ladder)
                        .inspect_err(|e| {
                            tracing::error!(
                                %digest,
                                algorithm = ladder.algorithm_name(),
                                "collision at strongest algorithm: {e}"
                            );
                        })?;
                    let promoted_digest = promoted.current().digest(content)?;

                    self.record_collision(&existing, content, &ladder, &promoted, &promoted_digest)
                        .await?;

                    ladder = promoted;
                    digest = promoted_digest;
                }
            }
        }
    }

    /// Fetch a card by digest
    pub async fn get(&self, digest: &str) -> CoreResult<Option<Card>> {
        self.probe(digest).await
    }

    /// Whether `content` is already stored under the current algorithm
    ///
    /// Advisory only: the algorithm may change before a later `create`.
    pub async fn has_digest_for(&self, content: &[u8]) -> CoreResult<bool> {
        self.check_content(content)?;
        let digest = self.escalation.current().current().digest(content)?;
        Ok(self
            .probe(&digest)
            .await?
            .is_some_and(|card| card.bytes == content))
    }

    /// Cards newest first
    pub async fn list(&self, limit: Option<usize>, offset: usize) -> CoreResult<Vec<Card>> {
        let store = self.store.as_ref();
        retry_busy(&self.retry, self.sleeper.as_ref(), "list", move || {
            store.list(limit, offset)
        })
        .await
    }

    pub async fn count(&self) -> CoreResult<usize> {
        let store = self.store.as_ref();
        retry_busy(&self.retry, self.sleeper.as_ref(), "count", move || store.count()).await
    }

    pub async fn delete(&self, digest: &str) -> CoreResult<DeleteOutcome> {
        let store = self.store.as_ref();
        let outcome = retry_busy(&self.retry, self.sleeper.as_ref(), "delete", move || {
            store.delete(digest)
        })
        .await?;
        if outcome == DeleteOutcome::Deleted {
            tracing::info!(%digest, "card deleted");
        }
        Ok(outcome)
    }

    fn check_content(&self, content: &[u8]) -> CoreResult<()> {
        if content.is_empty() {
            return Err(CoreError::EmptyContent);
        }
        if content.len() > self.max_content_size {
            return Err(CoreError::ContentTooLarge {
                size: content.len(),
                max: self.max_content_size,
            });
        }
        Ok(())
    }

    async fn probe(&self, digest: &str) -> CoreResult<Option<Card>> {
        let store = self.store.as_ref();
        retry_busy(&self.retry, self.sleeper.as_ref(), "probe", move || {
            store.probe(digest)
        })
        .await
    }

    /// `Some(card)` if committed, `None` if the key was already taken
    async fn insert(&self, card: Card) -> CoreResult<Option<Card>> {
        let store = self.store.as_ref();
        let candidate = &card;
        let outcome = retry_busy(&self.retry, self.sleeper.as_ref(), "insert", move || async move {
            match store.insert_if_absent(candidate.clone()).await? {
                InsertOutcome::Busy => Err(StorageError::Busy),
                other => Ok(other),
            }
        })
        .await?;

        Ok(match outcome {
            InsertOutcome::Committed => Some(card),
            InsertOutcome::AlreadyExists | InsertOutcome::Busy => None,
        })
    }

    async fn record_duplicate(&self, existing: &Card) -> CoreResult<Card> {
        tracing::info!(digest = %existing.digest, "duplicate submission");
        let record = AuditRecord::Duplicate(DuplicateRecord {
            observed_digest: existing.digest.clone(),
            original_claimed_at: existing.claimed_at,
            recorded_at: self.clock.now(),
            sequence: 0,
        });
        self.commit_audit(record).await
    }

    async fn record_collision(
        &self,
        existing: &Card,
        content: &[u8],
        observed: &EscalationLadder,
        promoted: &EscalationLadder,
        promoted_digest: &str,
    ) -> CoreResult<Card> {
        let record = CollisionRecord {
            original_digest: existing.digest.clone(),
            original_claimed_at: existing.claimed_at,
            promoted_digest: promoted_digest.to_string(),
            old_algorithm: observed.algorithm_name().to_string(),
            new_algorithm: promoted.algorithm_name().to_string(),
            similarity_score: similarity_score(&existing.bytes, content),
            sequence: 0,
        };
        tracing::warn!(
            original = %record.original_digest,
            promoted = %record.promoted_digest,
            old_algorithm = %record.old_algorithm,
            new_algorithm = %record.new_algorithm,
            similarity = record.similarity_score,
            "digest collision detected"
        );
        self.commit_audit(AuditRecord::Collision(record)).await
    }

    /// Store an audit record as its own card, re-serializing on self-collision
    ///
    /// A card already holding these exact bytes is the same record written by
    /// a concurrent caller and is returned as is.
    async fn commit_audit(&self, mut record: AuditRecord) -> CoreResult<Card> {
        let mut digest = String::new();
        for _ in 0..MAX_AUDIT_ATTEMPTS {
            let bytes = record.to_bytes()?;
            digest = self.escalation.current().current().digest(&bytes)?;

            let card = Card::new(digest.clone(), bytes.clone(), self.clock.now())
                .with_metadata(record.metadata());
            if let Some(card) = self.insert(card).await? {
                tracing::debug!(kind = record.kind(), digest = %card.digest, "audit record committed");
                return Ok(card);
            }

            if let Some(existing) = self.probe(&digest).await?
                && existing.bytes == bytes
            {
                tracing::debug!(kind = record.kind(), %digest, "audit record already committed");
                return Ok(existing);
            }

            tracing::debug!(
                kind = record.kind(),
                sequence = record.sequence(),
                %digest,
                "audit digest taken, re-serializing"
            );
            record.bump_sequence();
        }

        Err(CoreError::AuditUnresolvable {
            digest,
            attempts: MAX_AUDIT_ATTEMPTS,
        })
    }
}
