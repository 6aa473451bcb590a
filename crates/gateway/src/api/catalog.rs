//! Read-only catalog endpoints: system personas and session types.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

use wp_domain::model::SessionType;
use wp_personas::{catalog, session_types};

use crate::api::error::ApiError;
use crate::api::identity;
use crate::state::AppState;

/// GET /v1/personas — the system persona catalog (prompts excluded).
pub async fn list_personas(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    identity::authenticate(
        &headers,
        state.jwt_secret.as_ref().map(|s| s.as_slice()),
        Utc::now(),
    )?;
    Ok(Json(serde_json::json!({ "personas": catalog() })))
}

/// GET /v1/session-types — keys and labels for the session picker.
pub async fn list_session_types(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    identity::authenticate(
        &headers,
        state.jwt_secret.as_ref().map(|s| s.as_slice()),
        Utc::now(),
    )?;

    let types: Vec<_> = SessionType::ALL
        .iter()
        .map(|t| {
            serde_json::json!({
                "key": t.key(),
                "label": session_types::label(*t),
            })
        })
        .collect();
    Ok(Json(serde_json::json!({ "sessionTypes": types })))
}
