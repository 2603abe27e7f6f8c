//! HTTP route handlers for Glyphgate.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::any::Any;
use std::time::Duration;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};

use glyphgate_common::constants::codes;

use crate::state::AppState;

mod auth;
mod error;
mod health;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.session.request_timeout_secs);

    Router::new()
        // Health & Status
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))

        // Challenge endpoints
        .route("/start-auth", post(auth::start_auth))
        .route("/verify-auth", post(auth::verify_auth))
        .route("/session/{session_id}", get(auth::session_status))

        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())

        // Add shared state
        .with_state(state)
}

/// Last-resort handler: log the panic, leak nothing
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = %detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": codes::INTERNAL_ERROR })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, SecretConfig};
    use axum::body::Body;
    use axum::http::{Request, header};
    use chrono::{TimeDelta, Utc};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app() -> Router {
        let mut config = AppConfig::default();
        config.secrets.push(SecretConfig {
            user_id: "U1".into(),
            pattern: vec!["A".into(), "B".into(), "C".into()],
        });
        create_router(AppState::new(config).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn start(app: &Router, user: &str) -> Value {
        let (status, body) = send(app, post_json("/start-auth", json!({ "user_id": user }))).await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    #[tokio::test]
    async fn test_end_to_end_pass_then_replay() {
        let app = app();
        let challenge = start(&app, "U1").await;

        assert_eq!(challenge["expires_in"], 60);
        let grid = challenge["grid"].as_array().unwrap();
        assert_eq!(grid.len(), 9);
        for s in ["A", "B", "C"] {
            assert!(grid.contains(&json!(s)));
        }

        let session_id = challenge["session_id"].as_str().unwrap();
        let verify = json!({ "session_id": session_id, "input": ["A", "B", "C"] });

        let (status, body) = send(&app, post_json("/verify-auth", verify.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], "PASS");
        assert_eq!(body["user_id"], "U1");
        assert!(body["verified_at"].is_string());

        let (status, body) = send(&app, post_json("/verify-auth", verify)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["result"], "FAIL");
        assert_eq!(body["error"], "SESSION_USED");
    }

    #[tokio::test]
    async fn test_unknown_user_is_404() {
        let app = app();
        let (status, body) =
            send(&app, post_json("/start-auth", json!({ "user_id": "unknown" }))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "USER_NOT_FOUND" }));
    }

    #[tokio::test]
    async fn test_malformed_requests_are_400() {
        let app = app();

        let (status, body) = send(&app, post_json("/start-auth", json!({ "user": "U1" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "INVALID_REQUEST" }));

        let (status, _) = send(&app, post_json("/start-auth", json!({ "user_id": "" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            post_json("/verify-auth", json!({ "session_id": "x", "input": "ABC" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_REQUEST");

        let (status, body) = send(
            &app,
            post_json("/verify-auth", json!({ "session_id": "x", "input": ["A", "B"] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_REQUEST");

        let not_json = Request::builder()
            .method("POST")
            .uri("/verify-auth")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, _) = send(&app, not_json).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_attempt_budget_over_http() {
        let app = app();
        let challenge = start(&app, "U1").await;
        let session_id = challenge["session_id"].as_str().unwrap();
        let wrong = json!({ "session_id": session_id, "input": ["C", "B", "A"] });

        let (status, body) = send(&app, post_json("/verify-auth", wrong.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body,
            json!({ "result": "FAIL", "error": "INVALID_PATTERN", "attempts_remaining": 2 })
        );

        let (_, body) = send(&app, post_json("/verify-auth", wrong.clone())).await;
        assert_eq!(body["attempts_remaining"], 1);

        let (status, body) = send(&app, post_json("/verify-auth", wrong.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "MAX_ATTEMPTS");
        assert_eq!(body["attempts_remaining"], 0);

        let (status, body) = send(&app, post_json("/verify-auth", wrong)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "result": "FAIL", "error": "INVALID_SESSION" }));
    }

    #[tokio::test]
    async fn test_session_status() {
        let app = app();
        let challenge = start(&app, "U1").await;
        let session_id = challenge["session_id"].as_str().unwrap();

        let (status, body) = send(&app, get(&format!("/session/{}", session_id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], "U1");
        assert_eq!(body["attempts"], 0);
        assert_eq!(body["max_attempts"], 3);
        assert_eq!(body["used"], false);
        assert_eq!(body["expired"], false);
        assert!(body.get("secret_hash").is_none());
        assert!(body.get("pepper").is_none());

        let (status, body) = send(&app, get("/session/missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "INVALID_SESSION" }));
    }

    #[tokio::test]
    async fn test_expired_session_over_http() {
        let mut config = AppConfig::default();
        config.secrets.push(SecretConfig {
            user_id: "U1".into(),
            pattern: vec!["A".into(), "B".into(), "C".into()],
        });
        let state = AppState::new(config).unwrap();
        let sessions = state.sessions.clone();
        let app = create_router(state);

        let issued = Utc::now() - TimeDelta::seconds(120);
        let challenge = sessions.start_challenge_at("U1", issued).await.unwrap();
        let verify = json!({ "session_id": challenge.session_id, "input": ["A", "B", "C"] });

        let (status, body) = send(&app, post_json("/verify-auth", verify.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "result": "FAIL", "error": "SESSION_EXPIRED" }));

        // Expired sessions are removed on sight
        let (status, body) = send(&app, post_json("/verify-auth", verify)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "INVALID_SESSION");
        assert_eq!(sessions.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn test_health_and_metrics() {
        let app = app();
        start(&app, "U1").await;
        start(&app, "demo").await;

        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["active_sessions"], 2);

        let (status, body) = send(&app, get("/metrics")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["challenges_issued"], 2);
        assert_eq!(body["active_sessions"], 2);
    }

    #[test]
    fn test_panic_handler_hides_detail() {
        let resp = handle_panic(Box::new("secret detail".to_string()));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
