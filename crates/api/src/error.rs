use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use redactedhook_core::error::CoreError;
use redactedhook_core::filters::Rejection;
use redactedhook_indexer::FetchError;
use serde_json::json;

use crate::engine::HookError;

/// Seconds a caller should wait after a rate-limited answer; one budget
/// token is refilled in this time.
pub const RETRY_AFTER_SECS: u64 = 10;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for validation and auth failures, filter rejections
/// and upstream failures. Implements [`IntoResponse`] to produce consistent
/// JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `redactedhook_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A filter rejected the release.
    #[error("Rejected: {0}")]
    Rejected(Rejection),

    /// Tracker metadata could not be obtained.
    #[error("Upstream error: {0}")]
    Upstream(#[from] FetchError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<HookError> for AppError {
    fn from(err: HookError) -> Self {
        match err {
            HookError::Rejected(rejection) => AppError::Rejected(rejection),
            HookError::Upstream(fetch) => AppError::Upstream(fetch),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Filter rejections ---
            AppError::Rejected(rejection) => {
                (StatusCode::FORBIDDEN, rejection.code(), rejection.to_string())
            }

            // --- Upstream failures ---
            AppError::Upstream(FetchError::RateLimited { indexer }) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "UPSTREAM_RATE_LIMITED",
                format!("rate limit exceeded for {indexer}, retry later"),
            ),
            AppError::Upstream(err) => {
                tracing::error!(error = %err, "Upstream error");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "Failed to fetch data from the tracker".to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        let mut response = (status, axum::Json(body)).into_response();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            response.headers_mut().insert(
                header::RETRY_AFTER,
                HeaderValue::from(RETRY_AFTER_SECS),
            );
        }
        response
    }
}
