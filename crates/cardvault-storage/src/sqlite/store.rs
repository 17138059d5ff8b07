//! SQLite card store

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::schema::{check_version, init_schema};
use crate::card::{Card, format_timestamp, parse_timestamp};
use crate::error::{StorageError, StorageResult};
use crate::store::{DeleteOutcome, InsertOutcome, KeyedStore};

/// SQLite-backed card store
///
/// Uniqueness comes from the `digest` primary key; `insert_if_absent` is a
/// single `INSERT ... ON CONFLICT DO NOTHING` statement. Lock contention
/// beyond `busy_timeout` surfaces as `StorageError::Busy` or
/// `InsertOutcome::Busy`.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a database at the given path
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn, busy_timeout)
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, Duration::ZERO)
    }

    fn init(conn: Connection, busy_timeout: Duration) -> StorageResult<Self> {
        conn.busy_timeout(busy_timeout)?;
        init_schema(&conn)?;
        tracing::debug!(schema_version = check_version(&conn)?, "sqlite card store ready");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn card_from_row(row: &Row<'_>) -> rusqlite::Result<(String, Vec<u8>, String, Option<String>)> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
    }

    fn decode(
        (digest, bytes, claimed_at, metadata): (String, Vec<u8>, String, Option<String>),
    ) -> StorageResult<Card> {
        let metadata = metadata
            .map(|text| serde_json::from_str(&text))
            .transpose()?;
        Ok(Card {
            digest,
            bytes,
            claimed_at: parse_timestamp(&claimed_at)?,
            metadata,
        })
    }
}

#[async_trait]
impl KeyedStore for SqliteStore {
    async fn probe(&self, key: &str) -> StorageResult<Option<Card>> {
        let conn = self.conn();
        let row = conn
            .query_row(
                "SELECT digest, bytes, claimed_at, metadata FROM cards WHERE digest = ?",
                [key],
                Self::card_from_row,
            )
            .optional()?;

        row.map(Self::decode).transpose()
    }

    async fn insert_if_absent(&self, card: Card) -> StorageResult<InsertOutcome> {
        let metadata = card
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let conn = self.conn();
        let inserted = conn.execute(
            r#"INSERT INTO cards (digest, bytes, claimed_at, metadata)
               VALUES (?, ?, ?, ?)
               ON CONFLICT(digest) DO NOTHING"#,
            params![
                card.digest,
                card.bytes,
                format_timestamp(&card.claimed_at),
                metadata
            ],
        );

        match inserted.map_err(StorageError::from) {
            Ok(0) => Ok(InsertOutcome::AlreadyExists),
            Ok(_) => Ok(InsertOutcome::Committed),
            Err(StorageError::Busy) => Ok(InsertOutcome::Busy),
            Err(e) => Err(e),
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<DeleteOutcome> {
        let conn = self.conn();
        let removed = conn.execute("DELETE FROM cards WHERE digest = ?", [key])?;
        Ok(if removed == 0 {
            DeleteOutcome::NotFound
        } else {
            DeleteOutcome::Deleted
        })
    }

    async fn list(&self, limit: Option<usize>, offset: usize) -> StorageResult<Vec<Card>> {
        // SQLite treats a negative LIMIT as "no limit"
        let limit = limit.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);

        let conn = self.conn();
        let mut stmt = conn.prepare(
            r#"SELECT digest, bytes, claimed_at, metadata FROM cards
               ORDER BY claimed_at DESC, digest ASC
               LIMIT ? OFFSET ?"#,
        )?;

        let rows = stmt
            .query_map(params![limit, offset], Self::card_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(Self::decode).collect()
    }

    async fn count(&self) -> StorageResult<usize> {
        let conn = self.conn();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))?;
        usize::try_from(count).map_err(|e| StorageError::Backend(e.to_string()))
    }
}
