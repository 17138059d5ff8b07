//! SQLite schema definitions

use rusqlite::Connection;

use crate::error::StorageResult;

pub const SCHEMA_VERSION: u32 = 1;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        r#"
        -- Schema version tracking
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );

        -- One row per digest
        CREATE TABLE IF NOT EXISTS cards (
            digest TEXT PRIMARY KEY,               -- lowercase hex
            bytes BLOB NOT NULL,
            claimed_at TEXT NOT NULL,              -- RFC 3339, fixed width, UTC
            metadata TEXT                          -- JSON, nullable
        );

        CREATE INDEX IF NOT EXISTS idx_cards_claimed_at
            ON cards(claimed_at);
    "#,
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO schema_version (version) VALUES (?)",
        [SCHEMA_VERSION],
    )?;

    Ok(())
}

/// Check schema version
pub fn check_version(conn: &Connection) -> StorageResult<u32> {
    let version: u32 = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<u32>>(0)
        })?
        .unwrap_or(0);
    Ok(version)
}
