use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub const HEALTH_PATH: &str = "/healthz";

async fn health_check() -> &'static str {
    tracing::debug!("Health check request received");
    "OK"
}

pub fn router() -> Router<AppState> {
    Router::new().route(HEALTH_PATH, get(health_check))
}
