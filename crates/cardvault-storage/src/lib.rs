//! cardvault-storage: Keyed durable store for content-addressed cards
//!
//! Provides async store backends keyed by digest string. The store knows
//! nothing about hashing or escalation; that lives in `cardvault-core`.
//! Its one job is the put-if-absent guarantee: never two cards under one key.
//!
//! ## Backends
//!
//! | Backend         | Use Case                    | Feature Flag |
//! |-----------------|-----------------------------|--------------|
//! | `InMemoryStore` | Unit tests, ephemeral nodes | (always)     |
//! | `SqliteStore`   | Production (embedded)       | `sqlite`     |
//!
//! ## Example
//!
//! ```rust,ignore
//! use cardvault_storage::{Card, InMemoryStore, InsertOutcome, KeyedStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = InMemoryStore::new();
//!
//!     let card = Card::new("abc123", b"Hello, cards!".to_vec(), chrono::Utc::now());
//!     assert_eq!(store.insert_if_absent(card.clone()).await?, InsertOutcome::Committed);
//!     assert_eq!(store.insert_if_absent(card).await?, InsertOutcome::AlreadyExists);
//!
//!     Ok(())
//! }
//! ```

mod card;
mod descriptor;
mod error;
mod memory;
mod store;

#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-exports
pub use card::{Card, format_timestamp, parse_timestamp};
pub use descriptor::StoreDescriptor;
pub use error::{StorageError, StorageResult};
pub use memory::InMemoryStore;
pub use store::{DeleteOutcome, InsertOutcome, KeyedStore};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
