use anyhow::Result;
use async_trait::async_trait;

use crate::response::AgentResponse;

/// The opaque model-invocation capability.
///
/// Implementations may call any number of registered tools internally and
/// take a provider-dependent amount of time; callers only see the final
/// response.
#[async_trait]
pub trait ToolAgent: Send + Sync {
    async fn converse(&self, message: &str) -> Result<AgentResponse>;
}
