use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use redactedhook_core::records::{TorrentRecord, UserRecord};
use redactedhook_core::size::ByteSize;
use redactedhook_core::types::EntityKind;
use redactedhook_indexer::{
    CacheKey, FetchError, IndexerRecord, IndexerTransport, MetadataCache, MetadataFetcher,
    RateBudgets,
};

/// Transport double that counts outbound calls and answers from fixtures.
pub struct CountingTransport {
    pub calls: AtomicUsize,
    pub torrent: TorrentRecord,
    pub user: UserRecord,
    pub fail_with: Option<FetchError>,
}

impl CountingTransport {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            torrent: TorrentRecord {
                uploader: "alice".into(),
                group_name: "Selected Ambient Works".into(),
                release_name: "SAW &amp; more".into(),
                size: ByteSize(250 * 1024 * 1024),
                record_label: "Warp".into(),
                catalogue_number: "WARP 21".into(),
            },
            user: UserRecord {
                username: "alice".into(),
                ratio: 1.5,
            },
            fail_with: None,
        }
    }

    pub fn failing(err: FetchError) -> Self {
        Self {
            fail_with: Some(err),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IndexerTransport for CountingTransport {
    async fn fetch(&self, key: CacheKey, _api_key: &str) -> Result<IndexerRecord, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        Ok(match key.kind {
            EntityKind::Torrent => IndexerRecord::Torrent(Arc::new(self.torrent.clone())),
            EntityKind::User => IndexerRecord::User(Arc::new(self.user.clone())),
        })
    }
}

pub fn fetcher_with(transport: Arc<CountingTransport>) -> MetadataFetcher {
    MetadataFetcher::new(
        Arc::new(MetadataCache::new()),
        Arc::new(RateBudgets::default()),
        transport,
    )
}
