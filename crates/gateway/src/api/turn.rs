//! The turn endpoint — `POST /v1/turn`.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use wp_domain::model::{SessionType, StoredMessage};

use crate::api::error::ApiError;
use crate::api::identity;
use crate::runtime::{run_turn, TurnRequest};
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / response shapes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequestBody {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub coach_id: Option<String>,
    /// Required; must be non-empty after trimming.
    #[serde(default)]
    pub message: Option<String>,
    /// Storage path for voice messages; marks the message as a
    /// voice-derived transcript.
    #[serde(default)]
    pub voice_message_url: Option<String>,
    /// One of the session-type keys; unknown values fall back to the
    /// default session type.
    #[serde(default)]
    pub session_type: Option<String>,
    /// Per-request override of the classification feature gate.
    #[serde(default)]
    pub skip_sentiment_analysis: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponseBody {
    pub conversation_id: String,
    /// Always exactly the newly persisted user message followed by the
    /// newly persisted coach message.
    pub messages: [StoredMessage; 2],
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /v1/turn
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn turn(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
    body: Result<Json<TurnRequestBody>, axum::extract::rejection::JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let identity = identity::authenticate(
        &headers,
        state.jwt_secret.as_ref().map(|s| s.as_slice()),
        Utc::now(),
    )?;

    let Json(body) = body.map_err(|e| {
        ApiError::bad_request("Invalid JSON body").with_details(e.to_string())
    })?;

    let message = body
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::bad_request("Field 'message' must be a non-empty string"))?
        .to_owned();

    let session_type = body
        .session_type
        .as_deref()
        .and_then(SessionType::from_key);

    let request = TurnRequest {
        conversation_id: body.conversation_id.clone(),
        coach_id: body.coach_id,
        message,
        voice_message_url: body.voice_message_url,
        session_type,
        skip_sentiment_analysis: body.skip_sentiment_analysis,
    };

    // Serialize turns per conversation. Fresh conversations get a fresh
    // id, so only explicit ids can race.
    let _permit = match &body.conversation_id {
        Some(id) => Some(state.conversation_locks.acquire(id).await),
        None => None,
    };

    let outcome = run_turn(&state, &identity, request).await?;

    Ok(Json(TurnResponseBody {
        conversation_id: outcome.conversation_id,
        messages: [outcome.user_message, outcome.coach_message],
    }))
}
