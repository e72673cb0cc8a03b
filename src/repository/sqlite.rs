//! SQLite-backed record cache.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::{connect, parse_datetime, CacheError, CachedRecord, RecordCache, Result};
use crate::models::{ContentHash, EnrichedRecord};

/// Record cache stored in a single SQLite file.
///
/// A connection is opened per call and closed when it returns, so the file
/// is never held open across other work.
pub struct SqliteRecordCache {
    db_path: PathBuf,
}

impl SqliteRecordCache {
    /// Open (creating if needed) the cache at `db_path`.
    pub fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let cache = Self {
            db_path: db_path.to_path_buf(),
        };
        cache.init_schema()?;
        Ok(cache)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn init_schema(&self) -> Result<()> {
        let conn = connect(&self.db_path)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                hash TEXT PRIMARY KEY,
                record TEXT NOT NULL,
                cached_at TEXT NOT NULL
            );
        "#,
        )?;
        Ok(())
    }
}

impl RecordCache for SqliteRecordCache {
    fn has(&self, hash: &ContentHash) -> Result<bool> {
        let conn = connect(&self.db_path)?;
        let found = conn
            .query_row(
                "SELECT 1 FROM records WHERE hash = ?1",
                params![hash.as_str()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn put_if_absent(&self, hash: &ContentHash, record: &EnrichedRecord) -> Result<bool> {
        let json = serde_json::to_string(record).map_err(CacheError::Encode)?;
        let cached_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let conn = connect(&self.db_path)?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO records (hash, record, cached_at) VALUES (?1, ?2, ?3)",
            params![hash.as_str(), json, cached_at],
        )?;

        let existed = inserted == 0;
        debug!(
            "put_if_absent {} -> {}",
            hash.prefix(12),
            if existed { "existed" } else { "inserted" }
        );
        Ok(existed)
    }

    fn records(&self) -> Result<Vec<CachedRecord>> {
        let conn = connect(&self.db_path)?;
        let mut stmt =
            conn.prepare("SELECT hash, record, cached_at FROM records ORDER BY rowid")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>("hash")?,
                    row.get::<_, String>("record")?,
                    row.get::<_, String>("cached_at")?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(hash, record, cached_at)| {
                let record: EnrichedRecord =
                    serde_json::from_str(&record).map_err(|source| CacheError::Decode {
                        hash: hash.clone(),
                        source,
                    })?;
                Ok(CachedRecord {
                    hash: ContentHash::from_hex(hash),
                    record,
                    cached_at: parse_datetime(&cached_at)?,
                })
            })
            .collect()
    }

    fn len(&self) -> Result<usize> {
        let conn = connect(&self.db_path)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn latest_cached_at(&self) -> Result<Option<DateTime<Utc>>> {
        let conn = connect(&self.db_path)?;
        let latest: Option<String> =
            conn.query_row("SELECT MAX(cached_at) FROM records", [], |row| row.get(0))?;
        latest.as_deref().map(parse_datetime).transpose()
    }
}
