use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use carta_backend::{BackendApi, BackendClient};
use carta_core::config::AppConfig;
use carta_core::suggestions::follow_ups;
use carta_core::{ChatError, ErrorKind, Role};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::auth::{BedrockAuth, ModelInfo};
use crate::bedrock::BedrockConverse;
use crate::llm::ToolAgent;
use crate::session::SessionStore;
use crate::tools::default_registry;

const SYSTEM_PROMPT: &str = "You are a friendly and helpful shopping assistant for an e-commerce website. Your role is to help customers find products, manage their shopping cart, and provide excellent customer service.

**Your capabilities:**
- Search for products by name, category, or description
- Provide detailed product information including reviews and ratings
- Help customers add, remove, or update items in their shopping cart
- Compare products to help customers make informed decisions
- Provide shopping recommendations based on customer needs
- Assist with cart management and checkout guidance

**Guidelines:**
- Always be friendly, helpful, and enthusiastic about helping customers
- Use the available tools to provide accurate, up-to-date information
- When customers ask about products, use the search tools to find relevant items
- For cart operations, always confirm actions and provide clear feedback
- If you encounter errors, apologize and suggest alternatives
- Encourage customers to explore products and make purchases
- Use emojis and formatting to make responses engaging and easy to read
- Always provide specific product IDs when mentioning products so customers can easily reference them

Remember: You're here to make shopping easy and enjoyable for customers!";

const NOT_READY_RESPONSE: &str =
    "Sorry, the shopping assistant is not available right now. Please try again later.";
const PROCESSING_FAILED_RESPONSE: &str = "I apologize, but I encountered an error while processing your request. Please try again or rephrase your question.";

/// The outcome of one chat turn. Total failure still produces a response
/// string; `error` marks degraded outcomes for the HTTP surface.
#[derive(Clone, Debug)]
pub struct ChatOutcome {
    pub response: String,
    pub session_id: Option<String>,
    pub suggestions: Option<Vec<String>>,
    pub error: Option<ChatError>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub message_count: usize,
    pub user_preferences: HashMap<String, Value>,
}

#[derive(Clone, Debug, Serialize)]
pub struct StatusSnapshot {
    pub initialized: bool,
    pub bedrock_authenticated: bool,
    pub model_info: ModelInfo,
    pub active_sessions: usize,
    pub total_sessions: usize,
}

/// The orchestrator the HTTP surface talks to. Two states: uninitialized
/// (every turn short-circuits to an apology) and ready.
pub struct ShoppingAssistant {
    auth: BedrockAuth,
    sessions: SessionStore,
    backend: Arc<dyn BackendApi>,
    agent: Option<Arc<dyn ToolAgent>>,
    initialized: bool,
}

impl ShoppingAssistant {
    pub fn new(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let backend = Arc::new(BackendClient::new(
            &config.backend.base_url,
            Duration::from_secs(config.backend.timeout_secs),
        )?);

        Ok(Self::with_parts(
            BedrockAuth::new(config.bedrock.clone()),
            backend,
            SessionStore::new(config.session.timeout_minutes),
        ))
    }

    pub fn with_parts(
        auth: BedrockAuth,
        backend: Arc<dyn BackendApi>,
        sessions: SessionStore,
    ) -> Self {
        Self { auth, sessions, backend, agent: None, initialized: false }
    }

    /// Swap in a ready-made agent and mark the assistant ready. This is the
    /// seam for alternative providers and for tests with scripted agents.
    pub fn with_agent(mut self, agent: Arc<dyn ToolAgent>) -> Self {
        self.agent = Some(agent);
        self.initialized = true;
        self
    }

    /// Authenticate against the model provider and register the tool set.
    /// On any failure the assistant stays uninitialized and reports false.
    pub async fn initialize(&mut self) -> bool {
        info!("initializing shopping assistant agent");

        if !self.auth.authenticate() {
            error!("failed to authenticate with bedrock");
            return false;
        }

        let registry = default_registry(self.backend.clone());
        let tool_count = registry.len();
        let tool_names = registry.names().join(", ");

        match BedrockConverse::new(&self.auth, SYSTEM_PROMPT, registry) {
            Ok(agent) => {
                self.agent = Some(Arc::new(agent));
                self.initialized = true;
                info!(tool_count, tools = %tool_names, "shopping assistant agent initialized");
                true
            }
            Err(failure) => {
                error!(error = %failure, "failed to initialize shopping assistant agent");
                false
            }
        }
    }

    pub async fn process_message(&self, message: &str, session_id: Option<&str>) -> ChatOutcome {
        let agent = match (&self.agent, self.initialized) {
            (Some(agent), true) => agent.clone(),
            _ => {
                return ChatOutcome {
                    response: NOT_READY_RESPONSE.to_string(),
                    session_id: session_id.map(str::to_string),
                    suggestions: None,
                    error: Some(ChatError::new(
                        ErrorKind::AgentNotInitialized,
                        "agent not initialized",
                    )),
                }
            }
        };

        // An invalid or expired supplied id means "start a new conversation".
        let session_id = match session_id {
            Some(existing) if self.sessions.get_session(existing).is_some() => {
                existing.to_string()
            }
            _ => self.sessions.create_session(),
        };

        info!(
            session_id = %session_id,
            preview = %preview(message),
            "processing message"
        );

        self.sessions.add_message(&session_id, Role::User, message);

        match agent.converse(message).await {
            Ok(agent_response) => {
                let response_text = agent_response.into_text();
                self.sessions.add_message(&session_id, Role::Assistant, &response_text);

                info!(session_id = %session_id, preview = %preview(&response_text), "generated response");

                let suggestions = follow_ups(message, &response_text);
                ChatOutcome {
                    response: response_text,
                    session_id: Some(session_id),
                    suggestions: Some(suggestions),
                    error: None,
                }
            }
            Err(failure) => {
                error!(session_id = %session_id, error = %failure, "error processing message");
                ChatOutcome {
                    response: PROCESSING_FAILED_RESPONSE.to_string(),
                    session_id: Some(session_id),
                    suggestions: None,
                    error: Some(ChatError::new(
                        ErrorKind::AgentProcessingError,
                        failure.to_string(),
                    )),
                }
            }
        }
    }

    pub fn session_info(&self, session_id: &str) -> Option<SessionInfo> {
        let session = self.sessions.get_session(session_id)?;
        Some(SessionInfo {
            session_id: session.session_id,
            created_at: session.created_at,
            last_activity: session.last_activity,
            message_count: session.conversation_history.len(),
            user_preferences: session.user_preferences,
        })
    }

    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            initialized: self.initialized,
            bedrock_authenticated: self.auth.is_authenticated(),
            model_info: self.auth.model_info(),
            active_sessions: self.sessions.active_session_count(),
            total_sessions: self.sessions.total_session_count(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub async fn backend_health(&self) -> bool {
        self.backend.health_check().await
    }
}

fn preview(text: &str) -> String {
    text.chars().take(100).collect()
}
