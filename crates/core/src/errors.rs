use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Stable error kinds surfaced across the service.
///
/// Every kind carries a default user-facing message; retryable kinds also
/// carry a suggested retry delay. The wire form (`code()`) is what API
/// error payloads and logs use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    AuthenticationFailed,
    BackendUnavailable,
    BackendTimeout,
    BackendError,
    AgentNotInitialized,
    AgentProcessingError,
    SessionNotFound,
    InvalidInput,
    InternalError,
    RateLimited,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::BackendUnavailable => "backend_unavailable",
            Self::BackendTimeout => "backend_timeout",
            Self::BackendError => "backend_error",
            Self::AgentNotInitialized => "agent_not_initialized",
            Self::AgentProcessingError => "agent_processing_error",
            Self::SessionNotFound => "session_not_found",
            Self::InvalidInput => "invalid_input",
            Self::InternalError => "internal_error",
            Self::RateLimited => "rate_limited",
        }
    }

    pub fn user_message(self) -> &'static str {
        match self {
            Self::AuthenticationFailed => {
                "I'm having trouble connecting to my AI service. Please try again in a moment."
            }
            Self::BackendUnavailable => {
                "I can't access the product database right now. Please try again later."
            }
            Self::BackendTimeout => {
                "The product database is responding slowly. Please try again."
            }
            Self::BackendError => {
                "The product database returned an error. Please try again later."
            }
            Self::AgentNotInitialized => {
                "I'm not ready to help yet. Please wait a moment and try again."
            }
            Self::AgentProcessingError => {
                "I encountered an error while processing your request. Please try rephrasing your question."
            }
            Self::SessionNotFound => "I couldn't find our conversation. Let's start fresh!",
            Self::InvalidInput => "I didn't understand your request. Could you please rephrase it?",
            Self::InternalError => "Something went wrong on my end. Please try again.",
            Self::RateLimited => {
                "You're sending messages too quickly. Please wait a moment before trying again."
            }
        }
    }

    /// Suggested retry delay for kinds worth retrying, in seconds.
    pub fn retry_after_secs(self) -> Option<u64> {
        match self {
            Self::BackendTimeout => Some(10),
            Self::BackendUnavailable => Some(30),
            Self::AuthenticationFailed => Some(30),
            Self::RateLimited => Some(60),
            _ => None,
        }
    }

    pub fn is_retryable(self) -> bool {
        self.retry_after_secs().is_some()
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{}: {detail}", kind.code())]
pub struct ChatError {
    pub kind: ErrorKind,
    pub detail: String,
}

impl ChatError {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self { kind, detail: detail.into() }
    }

    /// The shape embedded in API responses under an `error` field.
    pub fn to_payload(&self) -> Value {
        let mut payload = json!({
            "code": self.kind.code(),
            "message": self.kind.user_message(),
            "details": self.detail,
        });
        if let Some(retry_after) = self.kind.retry_after_secs() {
            payload["retry_after"] = json!(retry_after);
        }
        payload
    }
}
