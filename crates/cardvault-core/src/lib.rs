//! # cardvault-core: Content-addressed provisioning with digest escalation
//!
//! Every card is keyed by a digest of its bytes. Saving identical bytes twice
//! is idempotent and audited; two different byte sequences sharing a digest
//! promote the active algorithm one rung up the escalation ladder, and the
//! promotion itself is recorded as a card in the same store.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cardvault_core::{AuditRecord, ProvisioningEngine};
//! use cardvault_storage::InMemoryStore;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = ProvisioningEngine::new(Arc::new(InMemoryStore::new()));
//!
//! let original = engine.create(b"hello").await?;
//! let again = engine.create(b"hello").await?;
//!
//! let record = AuditRecord::from_card(&again).expect("duplicate is audited");
//! assert_eq!(record.as_duplicate().unwrap().observed_digest, original.digest);
//! # Ok(())
//! # }
//! ```
//!
//! ## Ladder
//!
//! `md5 → sha1 → sha256 → sha512 → blake3`, optionally topped by a
//! [`PluggableDigest`]. Promotion never skips or reverses; a collision at the
//! top rung is an unrecoverable `NoStrongerAlgorithm` error.

pub mod audit;
pub mod clock;
pub mod digest;
pub mod error;
pub mod escalation;
pub mod ladder;
pub mod provision;
pub mod retry;

// Re-exports for convenience
pub use audit::{AuditRecord, CollisionRecord, DuplicateRecord, similarity_score};
pub use digest::{BuiltinDigest, DigestAlgorithm, DigestEngine, PluggableDigest};
pub use error::{CoreError, CoreResult};
pub use escalation::EscalationState;
pub use ladder::EscalationLadder;
pub use provision::{DEFAULT_MAX_CONTENT_SIZE, ProvisioningEngine, ProvisioningEngineBuilder};
pub use retry::{RecordingSleeper, RetryPolicy, Sleeper, TokioSleeper};

pub use cardvault_storage::{Card, DeleteOutcome, KeyedStore};

/// Non-empty lowercase-or-uppercase hex, the shape every digest has
pub fn looks_like_digest(candidate: &str) -> bool {
    !candidate.is_empty() && candidate.bytes().all(|b| b.is_ascii_hexdigit())
}
