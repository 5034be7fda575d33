//! Upstream side of the gateway: tracker API access, per-source rate
//! budgets and the TTL metadata cache, composed by [`MetadataFetcher`].

pub mod api;
pub mod cache;
pub mod error;
pub mod fetcher;
pub mod messages;
pub mod rate_limit;
pub mod record;

pub use api::{IndexerApi, IndexerEndpoints, IndexerTransport};
pub use cache::{CacheLookup, MetadataCache};
pub use error::FetchError;
pub use fetcher::MetadataFetcher;
pub use rate_limit::{RateBudget, RateBudgets};
pub use record::{CacheKey, IndexerRecord};
