pub mod health;

use axum::routing::any;
use axum::Router;

use crate::handlers::hook::handle_hook;
use crate::state::AppState;

/// Hook routes.
///
/// ```text
/// ANY /hook   -> handle_hook (non-POST answers 400)
/// ```
pub fn hook_routes() -> Router<AppState> {
    Router::new().route("/hook", any(handle_hook))
}
