//! The four release filters and the order they run in.
//!
//! Each `check_*` function is a pure predicate over already-fetched tracker
//! metadata. Which filters apply to a request is decided up front by
//! [`plan`], from the request fields alone.

use crate::html;
use crate::records::{TorrentRecord, UserRecord};
use crate::request::HookRequest;
use crate::size::ByteSize;
use crate::types::UploaderMode;
use crate::validation::{split_list, ValidatedRequest};

// ---------------------------------------------------------------------------
// Rejection reasons
// ---------------------------------------------------------------------------

/// Why a filter rejected a release.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    UploaderNotAllowed { uploader: String },
    RecordLabelNotFound,
    RecordLabelNotAllowed { label: String },
    SizeOutOfRange { size: ByteSize, min: ByteSize, max: ByteSize },
    RatioBelowMinimum { ratio: f64, minimum: f64 },
}

impl Rejection {
    /// Stable kebab-case reason tag, used in logs.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::UploaderNotAllowed { .. } => "uploader-not-allowed",
            Self::RecordLabelNotFound => "record-label-not-found",
            Self::RecordLabelNotAllowed { .. } => "record-label-not-allowed",
            Self::SizeOutOfRange { .. } => "size-out-of-range",
            Self::RatioBelowMinimum { .. } => "ratio-below-minimum",
        }
    }

    /// Machine-readable error code returned to the caller.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UploaderNotAllowed { .. } => "UPLOADER_NOT_ALLOWED",
            Self::RecordLabelNotFound => "RECORD_LABEL_NOT_FOUND",
            Self::RecordLabelNotAllowed { .. } => "RECORD_LABEL_NOT_ALLOWED",
            Self::SizeOutOfRange { .. } => "SIZE_OUT_OF_RANGE",
            Self::RatioBelowMinimum { .. } => "RATIO_BELOW_MINIMUM",
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UploaderNotAllowed { uploader } => {
                write!(f, "uploader is not allowed: {uploader}")
            }
            Self::RecordLabelNotFound => f.write_str("record label not found"),
            Self::RecordLabelNotAllowed { label } => {
                write!(f, "record label not allowed: {label}")
            }
            Self::SizeOutOfRange { size, min, max } => write!(
                f,
                "torrent size {size} is outside the requested range ({min} - {max})"
            ),
            Self::RatioBelowMinimum { ratio, minimum } => {
                write!(f, "ratio {ratio:.2} is below the minimum {minimum:.2}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Compare the release uploader against the list, case-insensitively.
pub fn check_uploader(
    torrent: &TorrentRecord,
    uploaders: &str,
    mode: UploaderMode,
) -> Result<(), Rejection> {
    let uploader = torrent.uploader.trim().to_lowercase();
    let listed = split_list(uploaders).any(|name| name.to_lowercase() == uploader);

    let allowed = match mode {
        UploaderMode::Whitelist => listed,
        UploaderMode::Blacklist => !listed,
    };
    if allowed {
        Ok(())
    } else {
        Err(Rejection::UploaderNotAllowed {
            uploader: torrent.uploader.clone(),
        })
    }
}

/// Require the release's record label to be one of the requested labels.
pub fn check_record_label(torrent: &TorrentRecord, labels: &str) -> Result<(), Rejection> {
    let label = normalize_label(&torrent.record_label);
    if label.is_empty() {
        return Err(Rejection::RecordLabelNotFound);
    }
    if split_list(labels).any(|wanted| normalize_label(wanted) == label) {
        Ok(())
    } else {
        Err(Rejection::RecordLabelNotAllowed { label })
    }
}

/// A zero bound means no bound on that side.
pub fn check_size(torrent: &TorrentRecord, min: ByteSize, max: ByteSize) -> Result<(), Rejection> {
    let size = torrent.size;
    let too_small = !min.is_zero() && size < min;
    let too_large = !max.is_zero() && size > max;
    if too_small || too_large {
        return Err(Rejection::SizeOutOfRange { size, min, max });
    }
    Ok(())
}

/// Pass iff `ratio >= minimum`.
pub fn check_ratio(user: &UserRecord, minimum: f64) -> Result<(), Rejection> {
    if user.ratio >= minimum {
        Ok(())
    } else {
        Err(Rejection::RatioBelowMinimum {
            ratio: user.ratio,
            minimum,
        })
    }
}

fn normalize_label(label: &str) -> String {
    html::unescape(label).trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// One applicable filter, with the request values it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Size { min: ByteSize, max: ByteSize },
    Uploader { list: String, mode: UploaderMode },
    RecordLabel { labels: String },
    /// `user_id` is `None` when no account id is known for the source; the
    /// check is then skipped.
    Ratio { user_id: Option<i64>, minimum: f64 },
}

impl Filter {
    pub fn needs_torrent(&self) -> bool {
        !matches!(self, Self::Ratio { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Size { .. } => "size",
            Self::Uploader { .. } => "uploader",
            Self::RecordLabel { .. } => "record_label",
            Self::Ratio { .. } => "ratio",
        }
    }
}

/// Half of a ratio check configuration, present without the other half.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioGap {
    /// A minimum ratio is set but no user id is known for the source.
    MissingUserId,
    /// A user id is known but no minimum ratio is set.
    MissingMinRatio,
}

impl std::fmt::Display for RatioGap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::MissingUserId => "user id is missing",
            Self::MissingMinRatio => "minratio is missing",
        })
    }
}

/// Report an incomplete ratio check configuration. `None` when both halves
/// are set or neither is.
pub fn ratio_gap(req: &HookRequest, validated: &ValidatedRequest) -> Option<RatioGap> {
    match (req.user_id(validated.indexer), req.min_ratio() > 0.0) {
        (None, true) => Some(RatioGap::MissingUserId),
        (Some(_), false) => Some(RatioGap::MissingMinRatio),
        _ => None,
    }
}

/// The filters that apply to a request, in evaluation order: size, uploader,
/// record label, ratio. Torrent filters are only planned when a torrent id
/// is present.
pub fn plan(req: &HookRequest, validated: &ValidatedRequest) -> Vec<Filter> {
    let mut filters = Vec::new();
    let has_torrent = req.torrent_id.is_some_and(|id| id > 0);

    if has_torrent {
        let (min, max) = (req.min_size(), req.max_size());
        if !min.is_zero() || !max.is_zero() {
            filters.push(Filter::Size { min, max });
        }
        if let (Some(list), Some(mode)) = (req.uploader_list(), validated.uploader_mode) {
            filters.push(Filter::Uploader {
                list: list.to_string(),
                mode,
            });
        }
        if let Some(labels) = req.record_label_list() {
            filters.push(Filter::RecordLabel {
                labels: labels.to_string(),
            });
        }
    }

    let minimum = req.min_ratio();
    if minimum > 0.0 {
        filters.push(Filter::Ratio {
            user_id: req.user_id(validated.indexer),
            minimum,
        });
    }

    filters
}
