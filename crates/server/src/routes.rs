use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderValue, Method, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use carta_agent::{SessionInfo, ShoppingAssistant, StatusSnapshot};
use carta_core::ErrorKind;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::health;

#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<ShoppingAssistant>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub message: String,
    pub cleaned_sessions: usize,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: Value,
}

fn api_error(status: StatusCode, kind: ErrorKind, detail: &str) -> (StatusCode, Json<ApiError>) {
    let mut payload = json!({
        "code": kind.code(),
        "message": kind.user_message(),
        "details": detail,
    });
    if let Some(retry_after) = kind.retry_after_secs() {
        payload["retry_after"] = json!(retry_after);
    }
    (status, Json(ApiError { error: payload }))
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .allow_credentials(true);

    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/health", get(health::health))
        .route("/api/status", get(service_status))
        .route("/api/sessions/{session_id}", get(session_info).delete(delete_session))
        .route("/api/sessions/cleanup", post(cleanup_sessions))
        .layer(cors)
        .with_state(state)
}

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ApiError>)> {
    if request.message.trim().is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            ErrorKind::InvalidInput,
            "message must not be empty",
        ));
    }

    if !state.assistant.is_initialized() {
        return Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::AgentNotInitialized,
            "shopping assistant service is not available",
        ));
    }

    let outcome =
        state.assistant.process_message(&request.message, request.session_id.as_deref()).await;

    if let Some(chat_error) = &outcome.error {
        // The customer still gets the degraded response below; the error is
        // operational signal only.
        warn!(error = %chat_error, "chat turn degraded");
    }

    let Some(session_id) = outcome.session_id else {
        return Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::InternalError,
            "chat outcome carried no session",
        ));
    };

    Ok(Json(ChatResponse {
        response: outcome.response,
        session_id,
        suggestions: outcome.suggestions,
    }))
}

pub async fn session_info(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<SessionInfo>, (StatusCode, Json<ApiError>)> {
    match state.assistant.session_info(&session_id) {
        Some(info) => Ok(Json(info)),
        None => Err(api_error(
            StatusCode::NOT_FOUND,
            ErrorKind::SessionNotFound,
            &format!("Session {session_id} not found or expired"),
        )),
    }
}

pub async fn delete_session(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<ApiError>)> {
    if state.assistant.sessions().delete_session(&session_id) {
        Ok(Json(json!({ "message": format!("Session {session_id} deleted successfully") })))
    } else {
        Err(api_error(
            StatusCode::NOT_FOUND,
            ErrorKind::SessionNotFound,
            &format!("Session {session_id} not found"),
        ))
    }
}

pub async fn cleanup_sessions(State(state): State<AppState>) -> Json<CleanupResponse> {
    let cleaned_sessions = state.assistant.sessions().cleanup_expired();
    info!(cleaned_sessions, "on-demand session cleanup");

    Json(CleanupResponse {
        message: format!("Cleaned up {cleaned_sessions} expired sessions"),
        cleaned_sessions,
    })
}

pub async fn service_status(State(state): State<AppState>) -> Json<StatusSnapshot> {
    Json(state.assistant.status())
}

#[cfg(test)]
mod tests {
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::Json;

    use super::{chat, cleanup_sessions, delete_session, service_status, session_info};
    use super::{AppState, ChatRequest};
    use crate::testutil::{ready_assistant, uninitialized_assistant};

    fn state_with(assistant: std::sync::Arc<carta_agent::ShoppingAssistant>) -> AppState {
        AppState { assistant }
    }

    #[tokio::test]
    async fn chat_round_trip_returns_response_session_and_suggestions() {
        let state = state_with(ready_assistant("Welcome"));

        let Json(reply) = chat(
            State(state.clone()),
            Json(ChatRequest { message: "Hello".to_string(), session_id: None }),
        )
        .await
        .expect("chat should succeed");

        assert_eq!(reply.response, "Welcome");
        assert!(!reply.session_id.is_empty());
        let suggestions = reply.suggestions.expect("suggestions should be present");
        assert!(suggestions.len() <= 3);

        // Same session id continues the same conversation.
        let Json(second) = chat(
            State(state.clone()),
            Json(ChatRequest {
                message: "Hello again".to_string(),
                session_id: Some(reply.session_id.clone()),
            }),
        )
        .await
        .expect("chat should succeed");
        assert_eq!(second.session_id, reply.session_id);

        let Json(info) = session_info(Path(reply.session_id.clone()), State(state))
            .await
            .expect("session should exist");
        assert_eq!(info.message_count, 4);
    }

    #[tokio::test]
    async fn empty_message_is_rejected_with_bad_request() {
        let state = state_with(ready_assistant("Welcome"));

        let (status, Json(body)) = chat(
            State(state),
            Json(ChatRequest { message: "   ".to_string(), session_id: None }),
        )
        .await
        .expect_err("empty message should be rejected");

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error["code"], "invalid_input");
    }

    #[tokio::test]
    async fn uninitialized_assistant_yields_service_unavailable() {
        let state = state_with(uninitialized_assistant());

        let (status, Json(body)) = chat(
            State(state.clone()),
            Json(ChatRequest { message: "Hello".to_string(), session_id: None }),
        )
        .await
        .expect_err("uninitialized service should refuse chat");

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.error["code"], "agent_not_initialized");
        assert_eq!(state.assistant.sessions().total_session_count(), 0);
    }

    #[tokio::test]
    async fn unknown_session_lookup_is_not_found() {
        let state = state_with(ready_assistant("Welcome"));

        let (status, Json(body)) =
            session_info(Path("missing".to_string()), State(state)).await.expect_err("404");
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error["code"], "session_not_found");
    }

    #[tokio::test]
    async fn delete_session_is_idempotent_across_http() {
        let state = state_with(ready_assistant("Welcome"));

        let Json(reply) = chat(
            State(state.clone()),
            Json(ChatRequest { message: "Hello".to_string(), session_id: None }),
        )
        .await
        .expect("chat should succeed");

        let Json(body) = delete_session(Path(reply.session_id.clone()), State(state.clone()))
            .await
            .expect("delete should succeed");
        assert!(body["message"].as_str().is_some_and(|m| m.contains("deleted successfully")));

        let (status, _) = delete_session(Path(reply.session_id), State(state))
            .await
            .expect_err("second delete should 404");
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cleanup_reports_the_removed_count() {
        let state = state_with(ready_assistant("Welcome"));

        let Json(body) = cleanup_sessions(State(state)).await;
        assert_eq!(body.cleaned_sessions, 0);
        assert_eq!(body.message, "Cleaned up 0 expired sessions");
    }

    #[tokio::test]
    async fn status_reports_orchestrator_counters() {
        let state = state_with(ready_assistant("Welcome"));

        chat(
            State(state.clone()),
            Json(ChatRequest { message: "Hello".to_string(), session_id: None }),
        )
        .await
        .expect("chat should succeed");

        let Json(status) = service_status(State(state)).await;
        assert!(status.initialized);
        assert_eq!(status.total_sessions, 1);
    }
}
