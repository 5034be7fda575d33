//! Cache-first, budget-limited metadata retrieval.

use std::sync::Arc;

use redactedhook_core::html;
use redactedhook_core::records::{TorrentRecord, UserRecord};
use redactedhook_core::types::Indexer;

use crate::api::IndexerTransport;
use crate::cache::{CacheLookup, MetadataCache};
use crate::error::FetchError;
use crate::rate_limit::RateBudgets;
use crate::record::{CacheKey, IndexerRecord};

/// Process-wide fetch service. Cheap to clone; clones share the cache and
/// the rate budgets.
#[derive(Clone)]
pub struct MetadataFetcher {
    cache: Arc<MetadataCache>,
    budgets: Arc<RateBudgets>,
    transport: Arc<dyn IndexerTransport>,
}

impl MetadataFetcher {
    pub fn new(
        cache: Arc<MetadataCache>,
        budgets: Arc<RateBudgets>,
        transport: Arc<dyn IndexerTransport>,
    ) -> Self {
        Self {
            cache,
            budgets,
            transport,
        }
    }

    pub fn cache(&self) -> &Arc<MetadataCache> {
        &self.cache
    }

    /// Return the record for `key`, fetching it on a miss or stale entry.
    ///
    /// A fresh cache hit never spends a budget token. Two concurrent misses
    /// on the same key may both fetch; the later write wins.
    pub async fn fetch(
        &self,
        key: CacheKey,
        api_key: Option<&str>,
    ) -> Result<IndexerRecord, FetchError> {
        let indexer = key.indexer;
        if let CacheLookup::Fresh(record) = self.cache.get(&key).await {
            tracing::trace!(%key, "Cache hit");
            return Ok(record);
        }

        let api_key = api_key
            .filter(|k| !k.is_empty())
            .ok_or(FetchError::MissingCredential {
                indexer: indexer.as_str(),
            })?;

        if !self.budgets.get(indexer).allow() {
            tracing::warn!(indexer = indexer.label(), %key, "Too many requests");
            return Err(FetchError::RateLimited {
                indexer: indexer.as_str(),
            });
        }

        let record = match self.transport.fetch(key, api_key).await {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(error = %e, %key, "Error fetching tracker data");
                return Err(e);
            }
        };

        if record.kind() != key.kind {
            return Err(FetchError::InvalidResponse(format!(
                "expected {} record, got {}",
                key.kind,
                record.kind()
            )));
        }

        if let IndexerRecord::Torrent(torrent) = &record {
            tracing::debug!(
                indexer = indexer.label(),
                release = %html::unescape(&torrent.release_name),
                uploader = %torrent.uploader,
                torrent_id = key.id,
                "Checking release",
            );
        }

        self.cache.put(key, record.clone()).await;
        Ok(record)
    }

    pub async fn fetch_torrent(
        &self,
        indexer: Indexer,
        id: i64,
        api_key: Option<&str>,
    ) -> Result<Arc<TorrentRecord>, FetchError> {
        match self.fetch(CacheKey::torrent(indexer, id), api_key).await? {
            IndexerRecord::Torrent(torrent) => Ok(torrent),
            IndexerRecord::User(_) => Err(FetchError::InvalidResponse(
                "expected torrent record".into(),
            )),
        }
    }

    pub async fn fetch_user(
        &self,
        indexer: Indexer,
        id: i64,
        api_key: Option<&str>,
    ) -> Result<Arc<UserRecord>, FetchError> {
        match self.fetch(CacheKey::user(indexer, id), api_key).await? {
            IndexerRecord::User(user) => Ok(user),
            IndexerRecord::Torrent(_) => {
                Err(FetchError::InvalidResponse("expected user record".into()))
            }
        }
    }
}
