//! Mapping of `AuthError` to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use glyphgate_common::AuthError;

/// Handler error wrapper
#[derive(Debug)]
pub struct ApiError {
    error: AuthError,
    /// Replaces the status derived from `error` when set
    status: Option<StatusCode>,
}

impl ApiError {
    /// Lookup miss on a read-only resource: 404 with the error's code
    pub fn not_found(error: AuthError) -> Self {
        Self {
            error,
            status: Some(StatusCode::NOT_FOUND),
        }
    }

    fn status(&self) -> StatusCode {
        self.status.unwrap_or_else(|| {
            StatusCode::from_u16(self.error.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        })
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        Self {
            error,
            status: None,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'static str>,
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attempts_remaining: Option<u32>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let err = self.error;

        match &err {
            AuthError::Config(_) | AuthError::Internal(_) => {
                tracing::error!(error = %err, "Request failed");
            }
            AuthError::InvalidRequest(msg) => {
                tracing::debug!(reason = %msg, "Rejected malformed request");
            }
            _ => {}
        }

        // "FAIL" marks a rejected verification, which is always a 401
        let body = ErrorBody {
            result: (status == StatusCode::UNAUTHORIZED).then_some("FAIL"),
            error: err.code(),
            attempts_remaining: err.attempts_remaining(),
        };

        (status, Json(body)).into_response()
    }
}
