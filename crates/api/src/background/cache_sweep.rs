//! Periodic removal of expired metadata cache entries.

use std::sync::Arc;
use std::time::Duration;

use redactedhook_indexer::MetadataCache;
use tokio_util::sync::CancellationToken;

/// Run the cache sweep loop until `cancel` is triggered.
pub async fn run(cache: Arc<MetadataCache>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = interval.as_secs(), "Cache sweep started");

    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately; nothing can be expired yet.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Cache sweep stopping");
                break;
            }
            _ = ticker.tick() => {
                let removed = cache.purge_expired().await;
                if removed > 0 {
                    tracing::debug!(removed, "Cache sweep: purged expired entries");
                }
            }
        }
    }
}
