//! Challenge issuance and verification endpoints.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use glyphgate_common::{AuthError, Challenge, SessionStatus, Symbol};

use super::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct StartAuthRequest {
    user_id: String,
}

/// Issue a new challenge for a registered user
pub async fn start_auth(
    State(state): State<AppState>,
    payload: Result<Json<StartAuthRequest>, JsonRejection>,
) -> Result<Json<Challenge>, ApiError> {
    let Json(payload) = payload.map_err(reject)?;

    let user_id = payload.user_id.trim();
    if user_id.is_empty() {
        return Err(AuthError::InvalidRequest("user_id must not be empty".into()).into());
    }

    let challenge = state.sessions.start_challenge(user_id).await?;
    Ok(Json(challenge))
}

#[derive(Deserialize)]
pub struct VerifyAuthRequest {
    session_id: String,
    /// Ordered symbols selected by the user
    input: Vec<Symbol>,
}

#[derive(Serialize)]
pub struct VerifyAuthResponse {
    result: &'static str,
    user_id: String,
    verified_at: DateTime<Utc>,
}

/// Verify a candidate selection
pub async fn verify_auth(
    State(state): State<AppState>,
    payload: Result<Json<VerifyAuthRequest>, JsonRejection>,
) -> Result<Json<VerifyAuthResponse>, ApiError> {
    let Json(payload) = payload.map_err(reject)?;

    let verified = state
        .sessions
        .verify(&payload.session_id, &payload.input)
        .await?;

    Ok(Json(VerifyAuthResponse {
        result: "PASS",
        user_id: verified.user_id,
        verified_at: verified.verified_at,
    }))
}

/// Read-only session diagnostics
pub async fn session_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionStatus>, ApiError> {
    state
        .sessions
        .status(&session_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(AuthError::InvalidSession))
}

fn reject(rejection: JsonRejection) -> ApiError {
    AuthError::InvalidRequest(rejection.body_text()).into()
}
