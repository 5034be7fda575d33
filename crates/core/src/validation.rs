//! Request validation.
//!
//! Runs against a fully-resolved [`HookRequest`] and reports the first
//! failing check. Checks run in a fixed priority: source, torrent id,
//! credential lengths, ratio, size bounds, uploader filter, record-label
//! filter. Nothing here mutates the request or touches the network.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;
use crate::request::HookRequest;
use crate::types::{Indexer, UploaderMode};

/// Largest accepted torrent id.
pub const MAX_TORRENT_ID: i64 = 999_999_999;

/// Largest accepted minimum ratio.
pub const MAX_MIN_RATIO: f64 = 999.999;

static UPLOADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_. ]+$").expect("valid regex"));

static RECORD_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\p{N}\s&,-]+$").expect("valid regex"));

/// The parts of a request that validation proves well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub indexer: Indexer,
    /// Set exactly when the request carries a non-empty uploader list.
    pub uploader_mode: Option<UploaderMode>,
}

/// Validate a resolved request, returning the parsed selector and mode.
pub fn validate_request(req: &HookRequest) -> Result<ValidatedRequest, CoreError> {
    let indexer = Indexer::from_str(req.indexer.trim())?;

    if let Some(id) = req.torrent_id {
        if !(0..=MAX_TORRENT_ID).contains(&id) {
            return Err(CoreError::Validation(format!("invalid torrent ID: {id}")));
        }
    }

    validate_key_length(req.red_apikey.as_deref(), Indexer::Redacted)?;
    validate_key_length(req.ops_apikey.as_deref(), Indexer::Ops)?;

    let ratio = req.min_ratio();
    if !(0.0..=MAX_MIN_RATIO).contains(&ratio) {
        return Err(CoreError::Validation(format!(
            "minratio must be between 0 and {MAX_MIN_RATIO}, got {ratio}"
        )));
    }

    let (min, max) = (req.min_size(), req.max_size());
    if !min.is_zero() && !max.is_zero() && min > max {
        return Err(CoreError::Validation(format!(
            "minsize ({min}) cannot be greater than maxsize ({max})"
        )));
    }

    let uploader_mode = match req.uploader_list() {
        Some(list) => {
            if split_list(list).any(|name| !UPLOADER_RE.is_match(name)) {
                return Err(CoreError::Validation(
                    "uploaders may only contain letters, digits, underscores, periods and spaces"
                        .into(),
                ));
            }
            Some(UploaderMode::from_str(req.mode.as_deref().unwrap_or("").trim())?)
        }
        None => None,
    };

    if let Some(list) = req.record_label_list() {
        if let Some(bad) = split_list(list).find(|label| !RECORD_LABEL_RE.is_match(label)) {
            return Err(CoreError::Validation(format!(
                "record_labels entry '{bad}' contains unsupported characters"
            )));
        }
    }

    Ok(ValidatedRequest {
        indexer,
        uploader_mode,
    })
}

fn validate_key_length(key: Option<&str>, indexer: Indexer) -> Result<(), CoreError> {
    match key {
        Some(key) if key.len() > indexer.max_key_length() => Err(CoreError::Validation(format!(
            "{} API key is too long (max {} characters)",
            indexer.label(),
            indexer.max_key_length()
        ))),
        _ => Ok(()),
    }
}

/// Split a comma-separated list into trimmed entries.
pub fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim)
}
