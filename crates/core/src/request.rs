//! The inbound hook payload.

use serde::{Deserialize, Serialize};

use crate::size::ByteSize;
use crate::types::Indexer;

/// One decoded hook call.
///
/// Every optional field keeps presence: `None` means the caller omitted the
/// field (or sent `null`) and the configured default applies, while an
/// explicit `0` or `""` means "no filter on this dimension".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HookRequest {
    /// Raw source selector; checked by the validator.
    #[serde(default)]
    pub indexer: String,
    #[serde(default)]
    pub red_user_id: Option<i64>,
    #[serde(default)]
    pub ops_user_id: Option<i64>,
    #[serde(default)]
    pub torrent_id: Option<i64>,
    #[serde(default)]
    pub red_apikey: Option<String>,
    #[serde(default)]
    pub ops_apikey: Option<String>,
    #[serde(default)]
    pub minratio: Option<f64>,
    #[serde(default)]
    pub minsize: Option<ByteSize>,
    #[serde(default)]
    pub maxsize: Option<ByteSize>,
    #[serde(default)]
    pub uploaders: Option<String>,
    #[serde(default)]
    pub record_labels: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    /// Display name, only used in log lines.
    #[serde(default)]
    pub torrentname: Option<String>,
}

impl HookRequest {
    /// Credential for the given source, if any non-empty one is present.
    pub fn api_key(&self, indexer: Indexer) -> Option<&str> {
        let key = match indexer {
            Indexer::Redacted => self.red_apikey.as_deref(),
            Indexer::Ops => self.ops_apikey.as_deref(),
        };
        key.filter(|k| !k.is_empty())
    }

    /// Account id for the given source; zero counts as unset.
    pub fn user_id(&self, indexer: Indexer) -> Option<i64> {
        let id = match indexer {
            Indexer::Redacted => self.red_user_id,
            Indexer::Ops => self.ops_user_id,
        };
        id.filter(|id| *id > 0)
    }

    pub fn min_ratio(&self) -> f64 {
        self.minratio.unwrap_or(0.0)
    }

    pub fn min_size(&self) -> ByteSize {
        self.minsize.unwrap_or_default()
    }

    pub fn max_size(&self) -> ByteSize {
        self.maxsize.unwrap_or_default()
    }

    /// Uploader list, `None` when absent or blank.
    pub fn uploader_list(&self) -> Option<&str> {
        self.uploaders.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Record-label list, `None` when absent or blank.
    pub fn record_label_list(&self) -> Option<&str> {
        self.record_labels.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Name used in log lines: the supplied display name or the torrent id.
    pub fn display_name(&self) -> String {
        match (&self.torrentname, self.torrent_id) {
            (Some(name), _) if !name.is_empty() => name.clone(),
            (_, Some(id)) => format!("torrent {id}"),
            _ => "unnamed release".to_string(),
        }
    }
}
