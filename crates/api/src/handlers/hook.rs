//! The `/hook` endpoint.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use redactedhook_core::request::HookRequest;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::ApiToken;
use crate::state::AppState;

/// Evaluate one release.
///
/// Order: token, method, JSON body, defaults and validation, filters.
/// Answers 200 with an empty body when every applicable filter passes.
pub async fn handle_hook(
    State(state): State<AppState>,
    _token: ApiToken,
    method: Method,
    body: Bytes,
) -> AppResult<StatusCode> {
    if method != Method::POST {
        return Err(AppError::BadRequest("only POST method is supported".into()));
    }

    let request: HookRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("invalid JSON payload: {e}")))?;

    let (request, validated) = state.engine.prepare(request).inspect_err(|e| {
        tracing::debug!(error = %e, "Hook request failed validation");
    })?;

    tracing::info!(
        indexer = validated.indexer.label(),
        torrent_id = ?request.torrent_id,
        release = %request.display_name(),
        "Received hook request"
    );

    let accepted = state.engine.evaluate(&request, &validated).await?;

    tracing::info!(
        indexer = accepted.indexer.label(),
        release = %accepted.name,
        checked = ?accepted.checked,
        "Conditions met, responding with status 200"
    );

    let webhook_url = state.config.current().notifications.discord_webhook_url.clone();
    if !webhook_url.is_empty() {
        state.notifier.spawn_send(
            webhook_url,
            format!("[{}] Accepted {}", accepted.indexer.label(), accepted.name),
        );
    }

    Ok(StatusCode::OK)
}
