#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use redactedhook_api::config::{AppConfig, ConfigStore};
use redactedhook_api::router::build_app_router;
use redactedhook_api::state::AppState;
use redactedhook_core::records::{TorrentRecord, UserRecord};
use redactedhook_core::size::ByteSize;
use redactedhook_core::types::EntityKind;
use redactedhook_indexer::{
    CacheKey, FetchError, IndexerRecord, IndexerTransport, MetadataCache, MetadataFetcher,
    RateBudgets,
};

pub const TOKEN: &str = "test-token";
pub const MB: u64 = 1024 * 1024;

/// In-process tracker that answers from fixtures and counts calls.
pub struct FakeTracker {
    calls: AtomicUsize,
    pub torrent: TorrentRecord,
    pub user: UserRecord,
    pub error: Option<FetchError>,
}

impl FakeTracker {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            torrent: TorrentRecord {
                uploader: "alice".into(),
                group_name: "Some Album".into(),
                release_name: "Artist - Some Album (2001) [FLAC]".into(),
                size: ByteSize(250 * MB),
                record_label: "Warp".into(),
                catalogue_number: "WARP 1".into(),
            },
            user: UserRecord {
                username: "me".into(),
                ratio: 1.0,
            },
            error: None,
        }
    }

    pub fn with_size(mut self, bytes: u64) -> Self {
        self.torrent.size = ByteSize(bytes);
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.torrent.record_label = label.into();
        self
    }

    pub fn with_ratio(mut self, ratio: f64) -> Self {
        self.user.ratio = ratio;
        self
    }

    pub fn failing(mut self, error: FetchError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IndexerTransport for FakeTracker {
    async fn fetch(&self, key: CacheKey, _api_key: &str) -> Result<IndexerRecord, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        Ok(match key.kind {
            EntityKind::Torrent => IndexerRecord::Torrent(Arc::new(self.torrent.clone())),
            EntityKind::User => IndexerRecord::User(Arc::new(self.user.clone())),
        })
    }
}

/// A valid configuration with no default filters.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.authorization.api_token = TOKEN.into();
    config.indexer_keys.red_apikey = "red-key".into();
    config.indexer_keys.ops_apikey = "ops-key".into();
    config
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<ConfigStore>,
    pub tracker: Arc<FakeTracker>,
}

/// Build the full application router backed by `tracker`.
pub fn build_test_app(config: AppConfig, tracker: FakeTracker) -> TestApp {
    let store = Arc::new(ConfigStore::from_config(config, "test-config.toml"));
    let tracker = Arc::new(tracker);
    let fetcher = MetadataFetcher::new(
        Arc::new(MetadataCache::new()),
        Arc::new(RateBudgets::default()),
        tracker.clone(),
    );
    let state = AppState::new(Arc::clone(&store), fetcher, reqwest::Client::new());

    TestApp {
        router: build_app_router(state),
        store,
        tracker,
    }
}

/// Send a request with the test token and a JSON body.
pub async fn post_hook(app: &TestApp, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, Some(TOKEN), body.to_string()).await
}

pub async fn send(
    app: &TestApp,
    method: Method,
    token: Option<&str>,
    body: String,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri("/hook")
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("x-api-token", token);
    }
    app.router
        .clone()
        .oneshot(builder.body(Body::from(body)).unwrap())
        .await
        .unwrap()
}

pub async fn get(app: &TestApp, uri: &str) -> Response<Body> {
    app.router
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
