use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use carta_backend::BackendApi;
use serde_json::{json, Value};

use super::Tool;

pub struct CartSummaryReport {
    api: Arc<dyn BackendApi>,
}

impl CartSummaryReport {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for CartSummaryReport {
    fn name(&self) -> &'static str {
        "get_cart_summary"
    }

    fn description(&self) -> &'static str {
        "Get a summary of the current shopping cart including all items and total cost."
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _input: Value) -> String {
        let summary = self.api.get_cart_summary().await;

        if summary.empty {
            return "🛒 **Your cart is empty!**\n\nReady to start shopping? I can help you find products or browse categories. What are you looking for today?"
                .to_string();
        }

        let mut result = format!("🛒 **Your Shopping Cart** ({} items)\n\n", summary.total_items);

        for item in &summary.items {
            let _ = writeln!(result, "{} **{}**", item.emoji, item.name);
            let _ = writeln!(
                result,
                "   💰 ${:.2} each × {} = ${:.2}",
                item.price,
                item.quantity,
                item.line_total()
            );
            let _ = writeln!(result, "   🆔 Cart Item ID: {}\n", item.id);
        }

        result.push_str(&"─".repeat(40));
        result.push('\n');
        let _ = writeln!(result, "📦 **Total Items:** {}", summary.total_items);
        let _ = writeln!(result, "💵 **Total Cost:** ${:.2}\n", summary.total_cost);

        result.push_str("**What would you like to do?**\n");
        result.push_str("• Continue shopping for more items\n");
        result.push_str("• Update quantities (just tell me the cart item ID and new quantity)\n");
        result.push_str("• Remove items (just tell me the cart item ID to remove)\n");
        result.push_str("• Proceed to checkout\n");
        result.push_str("• Clear the entire cart\n\n");
        result.push_str("Just let me know how I can help with your cart!");

        result
    }
}

pub struct CartTotal {
    api: Arc<dyn BackendApi>,
}

impl CartTotal {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for CartTotal {
    fn name(&self) -> &'static str {
        "get_cart_total"
    }

    fn description(&self) -> &'static str {
        "Get just the total cost of items in the cart."
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _input: Value) -> String {
        let summary = self.api.get_cart_summary().await;

        if summary.empty {
            return "Your cart is empty, so the total is $0.00.".to_string();
        }

        format!(
            "💵 Your cart total is **${:.2}** for {} items.",
            summary.total_cost, summary.total_items
        )
    }
}

pub struct CountCartItems {
    api: Arc<dyn BackendApi>,
}

impl CountCartItems {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for CountCartItems {
    fn name(&self) -> &'static str {
        "count_cart_items"
    }

    fn description(&self) -> &'static str {
        "Get the number of items currently in the cart."
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _input: Value) -> String {
        let summary = self.api.get_cart_summary().await;

        if summary.empty {
            return "Your cart is currently empty (0 items).".to_string();
        }

        let unique_products = summary.items.len();
        if unique_products == 1 {
            format!("📦 You have {} items of 1 product in your cart.", summary.total_items)
        } else {
            format!(
                "📦 You have {} items across {unique_products} different products in your cart.",
                summary.total_items
            )
        }
    }
}
