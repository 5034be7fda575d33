//! Closed enumerations shared by the request, the fetcher and the filters.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Indexer
// ---------------------------------------------------------------------------

/// One of the two supported tracker services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indexer {
    Redacted,
    Ops,
}

impl Indexer {
    /// Return the wire-format string for this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Redacted => "redacted",
            Self::Ops => "ops",
        }
    }

    /// Short tag used in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Redacted => "RED",
            Self::Ops => "OPS",
        }
    }

    /// Longest API key the tracker issues.
    pub fn max_key_length(&self) -> usize {
        match self {
            Self::Redacted => 42,
            Self::Ops => 120,
        }
    }

    /// Parse from a wire-format string.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "redacted" => Ok(Self::Redacted),
            "ops" => Ok(Self::Ops),
            "" => Err(CoreError::Validation("no source provided".into())),
            other => Err(CoreError::Validation(format!("invalid source: {other}"))),
        }
    }
}

impl std::fmt::Display for Indexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// The kind of record fetched from a tracker; doubles as the `action` query
/// parameter of the tracker API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Torrent,
    User,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Torrent => "torrent",
            Self::User => "user",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// UploaderMode
// ---------------------------------------------------------------------------

/// How the uploader list is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploaderMode {
    /// Pass only when the uploader is listed.
    Whitelist,
    /// Pass only when the uploader is not listed.
    Blacklist,
}

impl UploaderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Whitelist => "whitelist",
            Self::Blacklist => "blacklist",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "whitelist" => Ok(Self::Whitelist),
            "blacklist" => Ok(Self::Blacklist),
            _ => Err(CoreError::Validation(format!(
                "mode must be either 'whitelist' or 'blacklist', got '{s}'"
            ))),
        }
    }
}

impl std::fmt::Display for UploaderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
