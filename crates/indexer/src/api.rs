//! HTTP client for the trackers' `ajax.php` endpoints.

use std::time::Duration;

use async_trait::async_trait;
use redactedhook_core::types::Indexer;

use crate::error::FetchError;
use crate::messages;
use crate::record::{CacheKey, IndexerRecord};

pub const REDACTED_API_URL: &str = "https://redacted.ch/ajax.php";
pub const OPS_API_URL: &str = "https://orpheus.network/ajax.php";

/// Upper bound on one outbound call, connect to last body byte.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Performs one outbound metadata call. Implemented by [`IndexerApi`] and
/// by test doubles.
#[async_trait]
pub trait IndexerTransport: Send + Sync {
    async fn fetch(&self, key: CacheKey, api_key: &str) -> Result<IndexerRecord, FetchError>;
}

/// Base endpoint of each tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerEndpoints {
    pub redacted: String,
    pub ops: String,
}

impl IndexerEndpoints {
    pub fn get(&self, indexer: Indexer) -> &str {
        match indexer {
            Indexer::Redacted => &self.redacted,
            Indexer::Ops => &self.ops,
        }
    }
}

impl Default for IndexerEndpoints {
    fn default() -> Self {
        Self {
            redacted: REDACTED_API_URL.to_string(),
            ops: OPS_API_URL.to_string(),
        }
    }
}

/// reqwest-backed tracker client.
pub struct IndexerApi {
    client: reqwest::Client,
    endpoints: IndexerEndpoints,
}

impl IndexerApi {
    pub fn new(endpoints: IndexerEndpoints) -> Self {
        Self::with_client(reqwest::Client::new(), endpoints)
    }

    /// Reuse an existing [`reqwest::Client`] for connection pooling.
    pub fn with_client(client: reqwest::Client, endpoints: IndexerEndpoints) -> Self {
        Self { client, endpoints }
    }

    fn map_send_error(indexer: Indexer, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                indexer: indexer.as_str(),
            }
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl IndexerTransport for IndexerApi {
    async fn fetch(&self, key: CacheKey, api_key: &str) -> Result<IndexerRecord, FetchError> {
        let indexer = key.indexer;
        let id = key.id.to_string();

        let response = self
            .client
            .get(self.endpoints.get(indexer))
            .query(&[("action", key.kind.as_str()), ("id", id.as_str())])
            .header(reqwest::header::AUTHORIZATION, api_key)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| Self::map_send_error(indexer, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                indexer: indexer.as_str(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Self::map_send_error(indexer, e))?;

        messages::parse_response(indexer, key.kind, &body)
    }
}
