//! Reload the configuration file when it changes on disk.
//!
//! Polls the file's modification time; a changed timestamp triggers
//! [`ConfigStore::reload`]. An invalid file is logged and the previous
//! snapshot stays live.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::ConfigStore;

/// How often the file's modification time is checked.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

pub async fn run(store: Arc<ConfigStore>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(path = %store.path().display(), "Watching config file for changes");

    let mut last_modified = store.file_modified();
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Config watcher stopping");
                break;
            }
            _ = ticker.tick() => {
                let modified = store.file_modified();
                if modified.is_none() || modified == last_modified {
                    continue;
                }
                last_modified = modified;
                tracing::info!(path = %store.path().display(), "Config file changed, reloading");
                if let Err(e) = store.reload() {
                    tracing::error!(error = %e, "Config reload failed, keeping previous configuration");
                }
            }
        }
    }
}
