//! Store connection descriptors

use std::fmt;
use std::str::FromStr;

use crate::error::StorageError;

/// Which backend to open, parsed from configuration
///
/// Accepted forms: `memory`, `sqlite::memory:`, `sqlite:<path>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreDescriptor {
    Memory,
    SqliteInMemory,
    SqliteFile(String),
}

impl FromStr for StoreDescriptor {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("memory") {
            return Ok(StoreDescriptor::Memory);
        }
        match s.strip_prefix("sqlite:") {
            Some(":memory:") => Ok(StoreDescriptor::SqliteInMemory),
            Some(path) if !path.is_empty() => Ok(StoreDescriptor::SqliteFile(path.to_string())),
            _ => Err(StorageError::InvalidDescriptor(s.to_string())),
        }
    }
}

impl fmt::Display for StoreDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreDescriptor::Memory => write!(f, "memory"),
            StoreDescriptor::SqliteInMemory => write!(f, "sqlite::memory:"),
            StoreDescriptor::SqliteFile(path) => write!(f, "sqlite:{path}"),
        }
    }
}
