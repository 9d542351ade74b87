//! Callable capabilities exposed to the model.
//!
//! Each tool performs exactly one semantic operation against the store
//! backend and renders a deterministic, human-readable string for the model
//! to relay verbatim. Tools never fail: backend trouble surfaces as an
//! apology string, validation trouble as a plain explanation. Monetary
//! values are always rendered with exactly two decimal places.

use std::sync::Arc;

use async_trait::async_trait;
use carta_backend::BackendApi;
use serde_json::{json, Value};
use tracing::warn;

pub mod cart_management;
pub mod cart_summary;
pub mod product_details;
pub mod product_search;

pub use cart_management::{AddToCart, ClearCart, RemoveFromCart, UpdateCartQuantity};
pub use cart_summary::{CartSummaryReport, CartTotal, CountCartItems};
pub use product_details::{CompareProducts, ProductDetails};
pub use product_search::{AllProducts, ProductsByCategory, SearchProducts};

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn input_schema(&self) -> Value;
    async fn execute(&self, input: Value) -> String;
}

/// Registry handed to the agent: dispatch by name plus the Converse
/// `toolConfig` specs. Registration order is preserved so the specs the
/// model sees are stable.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        self.tools.push(Box::new(tool));
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    pub fn tool_specs(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|tool| {
                json!({
                    "toolSpec": {
                        "name": tool.name(),
                        "description": tool.description(),
                        "inputSchema": { "json": tool.input_schema() },
                    }
                })
            })
            .collect()
    }

    pub async fn execute(&self, name: &str, input: Value) -> String {
        match self.tools.iter().find(|tool| tool.name() == name) {
            Some(tool) => tool.execute(input).await,
            None => {
                warn!(tool = name, "model requested an unknown tool");
                format!("Sorry, I don't have a tool named '{name}'.")
            }
        }
    }
}

/// The full tool set the assistant registers at initialization.
pub fn default_registry(api: Arc<dyn BackendApi>) -> ToolRegistry {
    let mut registry = ToolRegistry::default();

    registry.register(SearchProducts::new(api.clone()));
    registry.register(AllProducts::new(api.clone()));
    registry.register(ProductsByCategory::new(api.clone()));

    registry.register(ProductDetails::new(api.clone()));
    registry.register(CompareProducts::new(api.clone()));

    registry.register(AddToCart::new(api.clone()));
    registry.register(RemoveFromCart::new(api.clone()));
    registry.register(UpdateCartQuantity::new(api.clone()));
    registry.register(ClearCart::new(api.clone()));

    registry.register(CartSummaryReport::new(api.clone()));
    registry.register(CartTotal::new(api.clone()));
    registry.register(CountCartItems::new(api));

    registry
}

pub(crate) fn int_arg(input: &Value, key: &str) -> Option<i64> {
    input.get(key).and_then(Value::as_i64)
}

pub(crate) fn str_arg<'a>(input: &'a Value, key: &str) -> Option<&'a str> {
    input.get(key).and_then(Value::as_str).filter(|value| !value.trim().is_empty())
}
