//! Normalized tracker metadata consumed by the filters.

use serde::{Deserialize, Serialize};

use crate::size::ByteSize;

/// Torrent metadata as returned by a tracker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TorrentRecord {
    pub uploader: String,
    pub group_name: String,
    pub release_name: String,
    pub size: ByteSize,
    pub record_label: String,
    pub catalogue_number: String,
}

/// Account metadata as returned by a tracker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub ratio: f64,
}
