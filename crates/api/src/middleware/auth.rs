//! Static API token extractor for the hook endpoint.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use redactedhook_core::error::CoreError;
use subtle::ConstantTimeEq;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the shared API token.
pub const API_TOKEN_HEADER: &str = "x-api-token";

/// Proof that the request carried the configured `X-API-Token`.
///
/// Use this as the first extractor of any handler that requires the token,
/// so authentication runs before the method or body are looked at.
#[derive(Debug, Clone, Copy)]
pub struct ApiToken;

impl FromRequestParts<AppState> for ApiToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let supplied = parts
            .headers
            .get(API_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Missing X-API-Token header".into()))
            })?;

        let config = state.config.current();
        let expected = config.authorization.api_token.as_str();
        let matches: bool = supplied.as_bytes().ct_eq(expected.as_bytes()).into();
        if expected.is_empty() || !matches {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid or missing API key".into(),
            )));
        }

        Ok(ApiToken)
    }
}
