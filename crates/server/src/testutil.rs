use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use carta_agent::{
    AgentResponse, BedrockAuth, SessionStore, ShoppingAssistant, ToolAgent,
};
use carta_backend::BackendApi;
use carta_core::config::BedrockConfig;
use carta_core::{CartItem, CartSummary, Product, Review};

/// Backend stub for handler tests: everything is empty, only the health
/// probe is scriptable.
pub struct NullStore {
    healthy: bool,
}

#[async_trait]
impl BackendApi for NullStore {
    async fn get_all_products(&self) -> Vec<Product> {
        Vec::new()
    }

    async fn get_product_by_id(&self, _product_id: i64) -> Option<Product> {
        None
    }

    async fn get_product_reviews(&self, _product_id: i64) -> Vec<Review> {
        Vec::new()
    }

    async fn search_products(&self, _query: &str, _category: Option<&str>) -> Vec<Product> {
        Vec::new()
    }

    async fn get_cart_items(&self) -> Vec<CartItem> {
        Vec::new()
    }

    async fn add_to_cart(&self, _product_id: i64, _quantity: u32) -> bool {
        false
    }

    async fn update_cart_item(&self, _cart_item_id: i64, _quantity: u32) -> bool {
        false
    }

    async fn remove_from_cart(&self, _cart_item_id: i64) -> bool {
        false
    }

    async fn get_cart_summary(&self) -> CartSummary {
        CartSummary::empty()
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }
}

struct ScriptedAgent {
    reply: &'static str,
}

#[async_trait]
impl ToolAgent for ScriptedAgent {
    async fn converse(&self, _message: &str) -> Result<AgentResponse> {
        Ok(AgentResponse::MessageText(self.reply.to_string()))
    }
}

fn auth_without_credentials() -> BedrockAuth {
    BedrockAuth::new(BedrockConfig {
        model_id: "us.amazon.nova-pro-v1:0".to_string(),
        region: "us-west-2".to_string(),
        api_key: None,
    })
}

pub fn uninitialized_assistant() -> Arc<ShoppingAssistant> {
    Arc::new(ShoppingAssistant::with_parts(
        auth_without_credentials(),
        Arc::new(NullStore { healthy: true }),
        SessionStore::new(60),
    ))
}

pub fn ready_assistant(reply: &'static str) -> Arc<ShoppingAssistant> {
    ready_assistant_with_backend(reply, true)
}

pub fn ready_assistant_with_backend(reply: &'static str, healthy: bool) -> Arc<ShoppingAssistant> {
    Arc::new(
        ShoppingAssistant::with_parts(
            auth_without_credentials(),
            Arc::new(NullStore { healthy }),
            SessionStore::new(60),
        )
        .with_agent(Arc::new(ScriptedAgent { reply })),
    )
}
