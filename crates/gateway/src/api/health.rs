//! Health probe.

use axum::response::IntoResponse;
use axum::Json;

/// GET /healthz — liveness probe, no auth.
pub async fn healthz() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
