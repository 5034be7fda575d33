//! TTL-bounded cache of tracker records.
//!
//! Reads take a shared lock and writes an exclusive one, so a reader never
//! sees a half-written entry. Expired entries read as [`CacheLookup::Stale`]
//! until the periodic sweep removes them.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::record::{CacheKey, IndexerRecord};

/// How long a fetched record stays usable.
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Interval of the background sweep that drops expired entries.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    record: IndexerRecord,
    fetched_at: Instant,
}

/// Result of a cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    /// Usable without a new fetch.
    Fresh(IndexerRecord),
    /// Present but older than the TTL; treat as a miss.
    Stale(IndexerRecord),
    Miss,
}

pub struct MetadataCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::with_ttl(CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub async fn get(&self, key: &CacheKey) -> CacheLookup {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if entry.fetched_at.elapsed() < self.ttl => {
                CacheLookup::Fresh(entry.record.clone())
            }
            Some(entry) => CacheLookup::Stale(entry.record.clone()),
            None => CacheLookup::Miss,
        }
    }

    pub async fn put(&self, key: CacheKey, record: IndexerRecord) {
        let entry = CacheEntry {
            record,
            fetched_at: Instant::now(),
        };
        self.entries.write().await.insert(key, entry);
    }

    /// Drop every expired entry; returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.fetched_at.elapsed() < self.ttl);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new()
    }
}
