pub mod catalog;
pub mod error;
pub mod health;
pub mod identity;
pub mod turn;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the full API router.
///
/// `/healthz` is public; everything else requires a bearer credential
/// (checked inside the handlers so each can report its own 401 detail).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/v1/turn", post(turn::turn))
        .route("/v1/personas", get(catalog::list_personas))
        .route("/v1/session-types", get(catalog::list_session_types))
}
