use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::auth::BedrockAuth;
use crate::llm::ToolAgent;
use crate::response::AgentResponse;
use crate::tools::ToolRegistry;

/// Upper bound on tool-use rounds within one conversation turn. The model
/// call itself carries no timeout; this bound is what keeps a single turn
/// from cycling through tools forever.
const MAX_TOOL_ROUNDS: usize = 8;

/// `ToolAgent` backed by the Bedrock runtime Converse API.
///
/// Each turn sends the user message plus the registry's tool specs; as long
/// as the model stops for `tool_use`, the requested tools are executed and
/// their results fed back, then the final message is returned for
/// normalization.
pub struct BedrockConverse {
    http: Client,
    endpoint: String,
    model_id: String,
    api_key: SecretString,
    system_prompt: String,
    tools: ToolRegistry,
}

impl BedrockConverse {
    pub fn new(
        auth: &BedrockAuth,
        system_prompt: impl Into<String>,
        tools: ToolRegistry,
    ) -> Result<Self> {
        let api_key = auth
            .api_key()
            .cloned()
            .context("bedrock agent requires an api key; authenticate first")?;

        // No request timeout here: the model invocation is deliberately
        // unbounded and the turn is bounded by MAX_TOOL_ROUNDS instead.
        let http = Client::builder().build().context("failed to build bedrock http client")?;

        Ok(Self {
            http,
            endpoint: runtime_endpoint(auth.region()),
            model_id: auth.model_id().to_string(),
            api_key,
            system_prompt: system_prompt.into(),
            tools,
        })
    }

    async fn call_model(&self, messages: &[Value]) -> Result<Value> {
        let url = format!("{}/model/{}/converse", self.endpoint, self.model_id);

        let mut body = json!({
            "messages": messages,
            "system": [{ "text": self.system_prompt }],
            "inferenceConfig": { "temperature": 0.7, "maxTokens": 2048 },
        });
        if !self.tools.is_empty() {
            body["toolConfig"] = json!({ "tools": self.tools.tool_specs() });
        }

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .context("bedrock converse request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            bail!("bedrock converse returned status {status}: {detail}");
        }

        response.json::<Value>().await.context("bedrock converse returned malformed json")
    }
}

fn runtime_endpoint(region: &str) -> String {
    format!("https://bedrock-runtime.{region}.amazonaws.com")
}

#[async_trait]
impl ToolAgent for BedrockConverse {
    async fn converse(&self, message: &str) -> Result<AgentResponse> {
        let mut messages = vec![json!({ "role": "user", "content": [{ "text": message }] })];

        for round in 0..MAX_TOOL_ROUNDS {
            let payload = self.call_model(&messages).await?;

            let stop_reason =
                payload.get("stopReason").and_then(Value::as_str).unwrap_or_default().to_string();
            let output_message = payload
                .get("output")
                .and_then(|output| output.get("message"))
                .cloned()
                .unwrap_or(Value::Null);

            if stop_reason != "tool_use" {
                debug!(round, stop_reason = %stop_reason, "model turn complete");
                return Ok(AgentResponse::from_value(json!({ "message": output_message })));
            }

            let content = output_message
                .get("content")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();

            let mut tool_results = Vec::new();
            for block in &content {
                let Some(tool_use) = block.get("toolUse") else { continue };
                let name = tool_use.get("name").and_then(Value::as_str).unwrap_or_default();
                let tool_use_id =
                    tool_use.get("toolUseId").and_then(Value::as_str).unwrap_or_default();
                let input = tool_use.get("input").cloned().unwrap_or(Value::Null);

                info!(round, tool = name, "executing tool requested by model");
                let result_text = self.tools.execute(name, input).await;
                tool_results.push(json!({
                    "toolResult": {
                        "toolUseId": tool_use_id,
                        "content": [{ "text": result_text }],
                    }
                }));
            }

            if tool_results.is_empty() {
                warn!(round, "model stopped for tool use without tool requests");
                return Ok(AgentResponse::from_value(json!({ "message": output_message })));
            }

            messages.push(json!({ "role": "assistant", "content": content }));
            messages.push(json!({ "role": "user", "content": tool_results }));
        }

        bail!("model kept requesting tools after {MAX_TOOL_ROUNDS} rounds")
    }
}

#[cfg(test)]
mod tests {
    use carta_core::config::BedrockConfig;

    use super::{runtime_endpoint, BedrockConverse};
    use crate::auth::BedrockAuth;
    use crate::tools::ToolRegistry;

    #[test]
    fn endpoint_is_derived_from_region() {
        assert_eq!(
            runtime_endpoint("us-west-2"),
            "https://bedrock-runtime.us-west-2.amazonaws.com"
        );
    }

    #[test]
    fn construction_requires_an_api_key() {
        let auth = BedrockAuth::new(BedrockConfig {
            model_id: "us.amazon.nova-pro-v1:0".to_string(),
            region: "us-west-2".to_string(),
            api_key: None,
        });

        let result = BedrockConverse::new(&auth, "be helpful", ToolRegistry::default());
        assert!(result.is_err());
    }

    #[test]
    fn construction_succeeds_with_an_api_key() {
        let auth = BedrockAuth::new(BedrockConfig {
            model_id: "us.amazon.nova-pro-v1:0".to_string(),
            region: "eu-west-1".to_string(),
            api_key: Some("bedrock-key".to_string().into()),
        });

        let agent = BedrockConverse::new(&auth, "be helpful", ToolRegistry::default())
            .expect("agent should build");
        assert_eq!(agent.endpoint, "https://bedrock-runtime.eu-west-1.amazonaws.com");
        assert_eq!(agent.model_id, "us.amazon.nova-pro-v1:0");
    }
}
