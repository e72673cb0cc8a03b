//! In-memory record cache.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use super::{CachedRecord, RecordCache, Result};
use crate::models::{ContentHash, EnrichedRecord};

/// Record cache held in memory, with the same semantics as the SQLite one.
#[derive(Default)]
pub struct MemoryRecordCache {
    inner: Mutex<Entries>,
}

#[derive(Default)]
struct Entries {
    order: Vec<ContentHash>,
    by_hash: HashMap<ContentHash, (EnrichedRecord, DateTime<Utc>)>,
}

impl MemoryRecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated cache.
    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = EnrichedRecord>,
    {
        let cache = Self::new();
        {
            let mut entries = cache.lock();
            for record in records {
                let hash = record.content_hash();
                if !entries.by_hash.contains_key(&hash) {
                    entries.order.push(hash.clone());
                    entries.by_hash.insert(hash, (record, Utc::now()));
                }
            }
        }
        cache
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Entries> {
        // Mutations are a single push + insert; poisoned state is consistent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RecordCache for MemoryRecordCache {
    fn has(&self, hash: &ContentHash) -> Result<bool> {
        Ok(self.lock().by_hash.contains_key(hash))
    }

    fn put_if_absent(&self, hash: &ContentHash, record: &EnrichedRecord) -> Result<bool> {
        let mut entries = self.lock();
        if entries.by_hash.contains_key(hash) {
            return Ok(true);
        }
        entries.order.push(hash.clone());
        entries
            .by_hash
            .insert(hash.clone(), (record.clone(), Utc::now()));
        Ok(false)
    }

    fn records(&self) -> Result<Vec<CachedRecord>> {
        let entries = self.lock();
        Ok(entries
            .order
            .iter()
            .filter_map(|hash| {
                entries.by_hash.get(hash).map(|(record, cached_at)| CachedRecord {
                    hash: hash.clone(),
                    record: record.clone(),
                    cached_at: *cached_at,
                })
            })
            .collect())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.lock().order.len())
    }

    fn latest_cached_at(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.lock().by_hash.values().map(|(_, at)| *at).max())
    }
}
