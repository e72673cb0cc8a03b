//! Persistent record cache.
//!
//! The cache maps a record's content hash to the enriched record. Entries are
//! append-only: once a hash is written it is never overwritten.

mod memory;
mod sqlite;

pub use memory::MemoryRecordCache;
pub use sqlite::SqliteRecordCache;

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use thiserror::Error;

use crate::models::{ContentHash, EnrichedRecord};

/// Errors from cache access.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Corrupt cache entry {hash}: {source}")]
    Decode {
        hash: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to encode record: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("Failed to create {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid cache timestamp {0:?}")]
    Timestamp(String),
}

pub type Result<T> = std::result::Result<T, CacheError>;

/// A stored record with its key and the instant it was cached.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedRecord {
    pub hash: ContentHash,
    pub record: EnrichedRecord,
    pub cached_at: DateTime<Utc>,
}

/// Key-value store of enriched records keyed by content hash.
pub trait RecordCache {
    fn has(&self, hash: &ContentHash) -> Result<bool>;

    /// Insert unless the key exists.
    ///
    /// Returns `true` when the key already existed (nothing written) and
    /// `false` when the record was inserted.
    fn put_if_absent(&self, hash: &ContentHash, record: &EnrichedRecord) -> Result<bool>;

    /// Every stored record, in insertion order.
    fn records(&self) -> Result<Vec<CachedRecord>>;

    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// When the most recent record was cached.
    fn latest_cached_at(&self) -> Result<Option<DateTime<Utc>>>;
}

/// Open a connection with durable, autocommit writes.
pub(crate) fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA synchronous = FULL;")?;
    Ok(conn)
}

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| CacheError::Timestamp(s.to_string()))
}
