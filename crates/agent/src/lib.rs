//! Agent runtime for the carta shopping assistant.
//!
//! This crate is the "brain" of the service. It wires a Bedrock-hosted
//! model to the store backend through a set of callable tools and keeps
//! per-customer conversation state:
//!
//! - **Sessions** (`session`) - in-memory conversation store with sliding
//!   expiry and a periodic sweep hook
//! - **Agent seam** (`llm`, `response`) - the opaque model-invocation
//!   capability and the normalization of its variably-shaped replies
//! - **Bedrock** (`auth`, `bedrock`) - credential handling and the Converse
//!   tool-use loop
//! - **Tools** (`tools`) - the callable capabilities exposed to the model;
//!   each performs one store operation and renders human-readable text
//! - **Orchestrator** (`assistant`) - `ShoppingAssistant`, the component the
//!   HTTP surface talks to
//!
//! # Safety principle
//!
//! The model is strictly a conversationalist. Catalog facts, cart contents,
//! and prices always come from the store backend through the tools; the
//! tools never let a backend failure escape as anything but an apology
//! string.

pub mod assistant;
pub mod auth;
pub mod bedrock;
pub mod llm;
pub mod response;
pub mod session;
pub mod tools;

pub use assistant::{ChatOutcome, SessionInfo, ShoppingAssistant, StatusSnapshot};
pub use auth::{AuthMethod, BedrockAuth, ModelInfo};
pub use llm::ToolAgent;
pub use response::AgentResponse;
pub use session::{Session, SessionStats, SessionStore};
