//! JSON error responses.
//!
//! Every failure leaves the API as `{ "error": ..., "details"?: ... }`
//! with a status from the fixed set {400, 401, 404, 500}.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::identity::IdentityError;
use crate::runtime::TurnError;

/// A client-visible API error.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = serde_json::json!({ "error": self.error });
        if let Some(details) = self.details {
            body["details"] = serde_json::Value::String(details);
        }
        (self.status, Json(body)).into_response()
    }
}

impl From<IdentityError> for ApiError {
    fn from(e: IdentityError) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: "Invalid credential".into(),
            details: Some(e.to_string()),
        }
    }
}

impl From<TurnError> for ApiError {
    fn from(e: TurnError) -> Self {
        use std::error::Error as _;

        let status = match &e {
            TurnError::EmptyMessage | TurnError::NoCoachConfigured => StatusCode::BAD_REQUEST,
            TurnError::ConversationNotFound => StatusCode::NOT_FOUND,
            TurnError::Store(_) | TurnError::Completion(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Surface the upstream cause (e.g. the completion status line) in
        // the details field.
        let details = e.source().map(|src| src.to_string());

        Self {
            status,
            error: e.to_string(),
            details,
        }
    }
}
