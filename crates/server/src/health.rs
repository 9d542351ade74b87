use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use crate::routes::AppState;

const SERVICE_NAME: &str = "shopping-assistant-chatbot";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: String,
    pub details: Value,
}

/// Health rolls up the orchestrator state and a live store-backend probe:
/// healthy = initialized with a reachable backend, degraded = initialized
/// but backend failing, unhealthy = not initialized.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let snapshot = state.assistant.status();
    let backend_api_healthy = state.assistant.backend_health().await;

    let status = if !snapshot.initialized {
        "unhealthy"
    } else if backend_api_healthy {
        "healthy"
    } else {
        "degraded"
    };

    let details = json!({
        "initialized": snapshot.initialized,
        "bedrock_authenticated": snapshot.bedrock_authenticated,
        "model_info": serde_json::to_value(&snapshot.model_info).unwrap_or(Value::Null),
        "active_sessions": snapshot.active_sessions,
        "total_sessions": snapshot.total_sessions,
        "backend_api_healthy": backend_api_healthy,
    });

    let status_code =
        if status == "unhealthy" { StatusCode::SERVICE_UNAVAILABLE } else { StatusCode::OK };

    (
        status_code,
        Json(HealthResponse {
            status,
            service: SERVICE_NAME,
            timestamp: Utc::now().to_rfc3339(),
            details,
        }),
    )
}
