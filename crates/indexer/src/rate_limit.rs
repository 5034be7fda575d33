//! Per-source outbound call budgets.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use redactedhook_core::types::Indexer;
use tokio::time::Instant;

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

const fn nonzero(n: u32) -> NonZeroU32 {
    match NonZeroU32::new(n) {
        Some(v) => v,
        None => panic!("quota values must be non-zero"),
    }
}

/// One token every 10 seconds.
const REFILL_PER_MINUTE: NonZeroU32 = nonzero(6);
const REDACTED_BURST: NonZeroU32 = nonzero(10);
const OPS_BURST: NonZeroU32 = nonzero(5);

/// Token bucket for one tracker. Accounting is atomic, so a budget can be
/// shared freely between concurrent requests.
#[derive(Clone)]
pub struct RateBudget {
    limiter: Arc<DirectLimiter>,
    quota: Quota,
}

impl RateBudget {
    pub fn new(quota: Quota) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
            quota,
        }
    }

    /// Default budget for a source.
    pub fn for_indexer(indexer: Indexer) -> Self {
        let burst = match indexer {
            Indexer::Redacted => REDACTED_BURST,
            Indexer::Ops => OPS_BURST,
        };
        Self::new(Quota::per_minute(REFILL_PER_MINUTE).allow_burst(burst))
    }

    pub fn burst(&self) -> u32 {
        self.quota.burst_size().get()
    }

    /// Time for one spent token to come back.
    pub fn refill_interval(&self) -> Duration {
        self.quota.replenish_interval()
    }

    /// Take a token if one is available right now.
    pub fn allow(&self) -> bool {
        self.limiter.check().is_ok()
    }

    /// Wait for a token until `deadline`. Returns `false` on timeout.
    pub async fn wait(&self, deadline: Instant) -> bool {
        tokio::time::timeout_at(deadline, self.limiter.until_ready())
            .await
            .is_ok()
    }
}

impl std::fmt::Debug for RateBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateBudget")
            .field("burst", &self.burst())
            .field("refill_interval", &self.refill_interval())
            .finish()
    }
}

/// The budgets of both trackers, built once at startup.
#[derive(Debug, Clone)]
pub struct RateBudgets {
    redacted: RateBudget,
    ops: RateBudget,
}

impl RateBudgets {
    pub fn new(redacted: RateBudget, ops: RateBudget) -> Self {
        Self { redacted, ops }
    }

    pub fn get(&self, indexer: Indexer) -> &RateBudget {
        match indexer {
            Indexer::Redacted => &self.redacted,
            Indexer::Ops => &self.ops,
        }
    }
}

impl Default for RateBudgets {
    fn default() -> Self {
        Self::new(
            RateBudget::for_indexer(Indexer::Redacted),
            RateBudget::for_indexer(Indexer::Ops),
        )
    }
}
