use std::sync::Arc;

use crate::config::ConfigStore;
use crate::engine::HookEngine;
use crate::notifications::DiscordNotifier;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Live configuration snapshot store.
    pub config: Arc<ConfigStore>,
    /// Hook evaluation pipeline (owns the fetcher, cache and rate budgets).
    pub engine: HookEngine,
    /// Posts accepted releases to Discord when a webhook is configured.
    pub notifier: DiscordNotifier,
}

impl AppState {
    pub fn new(
        config: Arc<ConfigStore>,
        fetcher: redactedhook_indexer::MetadataFetcher,
        http: reqwest::Client,
    ) -> Self {
        Self {
            engine: HookEngine::new(Arc::clone(&config), fetcher),
            notifier: DiscordNotifier::new(http),
            config,
        }
    }
}
