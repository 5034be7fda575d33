//! Tracker `ajax.php` response shapes.
//!
//! Both trackers wrap every answer as
//! `{"status": "success"|"failure", "error": "...", "response": {...}}`.
//! The envelope is decoded first so a failure status is reported with the
//! tracker's message even when `response` is absent. The payload is then
//! decoded into the shape matching the requested [`EntityKind`].

use std::sync::Arc;

use redactedhook_core::records::{TorrentRecord, UserRecord};
use redactedhook_core::size::ByteSize;
use redactedhook_core::types::{EntityKind, Indexer};
use serde::Deserialize;

use crate::error::FetchError;
use crate::record::IndexerRecord;

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    response: serde_json::Value,
}

/// `action=torrent` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct TorrentResponse {
    pub group: TorrentGroup,
    pub torrent: TorrentDetails,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TorrentGroup {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TorrentDetails {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "remasterRecordLabel", default)]
    pub record_label: String,
    #[serde(rename = "filePath", default)]
    pub file_path: String,
    #[serde(rename = "remasterCatalogueNumber", default)]
    pub catalogue_number: String,
}

/// `action=user` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct UserResponse {
    pub username: String,
    pub stats: UserStats,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserStats {
    pub ratio: f64,
}

impl From<TorrentResponse> for TorrentRecord {
    fn from(r: TorrentResponse) -> Self {
        TorrentRecord {
            uploader: r.torrent.username,
            group_name: r.group.name,
            release_name: r.torrent.file_path,
            size: ByteSize(r.torrent.size),
            record_label: r.torrent.record_label,
            catalogue_number: r.torrent.catalogue_number,
        }
    }
}

impl From<UserResponse> for UserRecord {
    fn from(r: UserResponse) -> Self {
        UserRecord {
            username: r.username,
            ratio: r.stats.ratio,
        }
    }
}

/// Decode a tracker response body for the given entity kind.
pub fn parse_response(
    indexer: Indexer,
    kind: EntityKind,
    body: &[u8],
) -> Result<IndexerRecord, FetchError> {
    let envelope: Envelope =
        serde_json::from_slice(body).map_err(|e| FetchError::InvalidResponse(e.to_string()))?;

    if envelope.status != "success" {
        return Err(FetchError::Api {
            indexer: indexer.as_str(),
            message: envelope
                .error
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("status '{}'", envelope.status)),
        });
    }

    let invalid = |e: serde_json::Error| FetchError::InvalidResponse(e.to_string());
    match kind {
        EntityKind::Torrent => {
            let parsed: TorrentResponse = serde_json::from_value(envelope.response).map_err(invalid)?;
            Ok(IndexerRecord::Torrent(Arc::new(parsed.into())))
        }
        EntityKind::User => {
            let parsed: UserResponse = serde_json::from_value(envelope.response).map_err(invalid)?;
            Ok(IndexerRecord::User(Arc::new(parsed.into())))
        }
    }
}
