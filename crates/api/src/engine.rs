//! The hook evaluation pipeline: resolve, validate, fetch, filter.

use std::sync::Arc;

use redactedhook_core::error::CoreError;
use redactedhook_core::filters::{self, Filter, Rejection};
use redactedhook_core::request::HookRequest;
use redactedhook_core::types::Indexer;
use redactedhook_core::validation::{validate_request, ValidatedRequest};
use redactedhook_indexer::{FetchError, MetadataFetcher};

use crate::config::ConfigStore;

/// Why an evaluated request was not accepted.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("{0}")]
    Rejected(Rejection),

    #[error(transparent)]
    Upstream(#[from] FetchError),
}

/// A request that has passed every applicable filter.
#[derive(Debug, Clone)]
pub struct Accepted {
    pub indexer: Indexer,
    pub name: String,
    /// Names of the filters that ran, in order.
    pub checked: Vec<&'static str>,
}

/// Evaluates hook requests against tracker metadata.
#[derive(Clone)]
pub struct HookEngine {
    config: Arc<ConfigStore>,
    fetcher: MetadataFetcher,
}

impl HookEngine {
    pub fn new(config: Arc<ConfigStore>, fetcher: MetadataFetcher) -> Self {
        Self { config, fetcher }
    }

    /// Fill omitted fields from the current defaults, then validate.
    ///
    /// Nothing here touches the network, so a request that fails here never
    /// spends a rate-budget token.
    pub fn prepare(&self, mut req: HookRequest) -> Result<(HookRequest, ValidatedRequest), CoreError> {
        self.config.current().hook_defaults().apply(&mut req);
        let validated = validate_request(&req)?;
        Ok((req, validated))
    }

    /// Run every applicable filter in order; the first failure wins.
    pub async fn evaluate(
        &self,
        req: &HookRequest,
        validated: &ValidatedRequest,
    ) -> Result<Accepted, HookError> {
        let indexer = validated.indexer;
        let api_key = req.api_key(indexer);
        let plan = filters::plan(req, validated);
        let mut checked = Vec::with_capacity(plan.len());

        if let Some(gap) = filters::ratio_gap(req, validated) {
            tracing::warn!(
                indexer = indexer.label(),
                "Incomplete ratio check configuration: {gap}"
            );
        }

        let torrent = match (plan.iter().any(Filter::needs_torrent), req.torrent_id) {
            (true, Some(id)) => Some(self.fetcher.fetch_torrent(indexer, id, api_key).await?),
            _ => None,
        };

        for filter in &plan {
            let outcome = match (filter, torrent.as_deref()) {
                (Filter::Size { min, max }, Some(t)) => filters::check_size(t, *min, *max),
                (Filter::Uploader { list, mode }, Some(t)) => {
                    tracing::trace!(indexer = indexer.label(), %mode, uploaders = %list, "Requested uploaders");
                    filters::check_uploader(t, list, *mode)
                }
                (Filter::RecordLabel { labels }, Some(t)) => {
                    tracing::trace!(indexer = indexer.label(), labels = %labels, "Requested record labels");
                    filters::check_record_label(t, labels)
                }
                (Filter::Ratio { user_id, minimum }, _) => {
                    let Some(user_id) = user_id else {
                        continue;
                    };
                    self.check_ratio(indexer, *user_id, *minimum, api_key).await?
                }
                _ => continue,
            };

            if let Err(rejection) = outcome {
                tracing::debug!(
                    indexer = indexer.label(),
                    filter = filter.name(),
                    reason = rejection.tag(),
                    "{rejection}"
                );
                return Err(HookError::Rejected(rejection));
            }
            checked.push(filter.name());
        }

        Ok(Accepted {
            indexer,
            name: req.display_name(),
            checked,
        })
    }

    async fn check_ratio(
        &self,
        indexer: Indexer,
        user_id: i64,
        minimum: f64,
        api_key: Option<&str>,
    ) -> Result<Result<(), Rejection>, FetchError> {
        let user = self.fetcher.fetch_user(indexer, user_id, api_key).await?;
        tracing::trace!(
            indexer = indexer.label(),
            username = %user.username,
            minimum,
            "Checking ratio"
        );
        let outcome = filters::check_ratio(&user, minimum);
        if outcome.is_ok() {
            self.maybe_raise_min_ratio(indexer, user.ratio);
        }
        Ok(outcome)
    }

    fn maybe_raise_min_ratio(&self, indexer: Indexer, observed: f64) {
        let config = self.config.current();
        if !config.dynamic_ratio.enabled {
            tracing::debug!(indexer = indexer.label(), "Dynamic minratio updating is disabled");
            return;
        }
        if config.ratio.minratio <= 0.0 {
            return;
        }
        if let Some(raised) = self.config.raise_min_ratio(observed) {
            tracing::info!(indexer = indexer.label(), minratio = raised, "Raised default minratio");
        }
    }
}
