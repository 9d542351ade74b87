use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use carta_backend::BackendApi;
use carta_core::CartItem;
use serde_json::{json, Value};

use super::{int_arg, Tool};

pub struct AddToCart {
    api: Arc<dyn BackendApi>,
}

impl AddToCart {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for AddToCart {
    fn name(&self) -> &'static str {
        "add_to_cart"
    }

    fn description(&self) -> &'static str {
        "Add a product to the shopping cart."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "product_id": {
                    "type": "integer",
                    "description": "The ID of the product to add to cart"
                },
                "quantity": {
                    "type": "integer",
                    "description": "Number of items to add (default: 1)"
                }
            },
            "required": ["product_id"]
        })
    }

    async fn execute(&self, input: Value) -> String {
        let Some(product_id) = int_arg(&input, "product_id") else {
            return "I need a product ID to add to your cart.".to_string();
        };
        let quantity = int_arg(&input, "quantity").unwrap_or(1);

        // Validation happens before any backend call.
        if quantity <= 0 {
            return "Quantity must be a positive number. Please specify how many items you'd like to add."
                .to_string();
        }
        let quantity = quantity as u32;

        let Some(product) = self.api.get_product_by_id(product_id).await else {
            return format!(
                "Product with ID {product_id} not found. Please check the product ID and try again."
            );
        };

        if self.api.add_to_cart(product_id, quantity).await {
            let total_cost = product.price * f64::from(quantity);
            let mut result = format!("✅ Added {quantity}x **{}** to your cart!\n\n", product.name);
            let _ = writeln!(result, "{} {}", product.emoji, product.name);
            let _ = writeln!(result, "💰 ${:.2} each", product.price);
            let _ = writeln!(result, "📦 Quantity: {quantity}");
            let _ = writeln!(result, "💵 Total: ${total_cost:.2}\n");
            result.push_str("Would you like to continue shopping or view your cart?");
            result
        } else {
            format!("Sorry, I couldn't add {} to your cart. Please try again later.", product.name)
        }
    }
}

pub struct RemoveFromCart {
    api: Arc<dyn BackendApi>,
}

impl RemoveFromCart {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for RemoveFromCart {
    fn name(&self) -> &'static str {
        "remove_from_cart"
    }

    fn description(&self) -> &'static str {
        "Remove an item from the shopping cart."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "cart_item_id": {
                    "type": "integer",
                    "description": "The ID of the cart item to remove"
                }
            },
            "required": ["cart_item_id"]
        })
    }

    async fn execute(&self, input: Value) -> String {
        let Some(cart_item_id) = int_arg(&input, "cart_item_id") else {
            return "I need a cart item ID to remove.".to_string();
        };

        // There is no direct cart-item lookup endpoint; find it in the full
        // listing so a bad id is reported instead of silently ignored.
        let cart_items = self.api.get_cart_items().await;
        let Some(item) = find_item(&cart_items, cart_item_id) else {
            return format!(
                "Cart item with ID {cart_item_id} not found. Please check your cart and try again."
            );
        };

        if self.api.remove_from_cart(cart_item_id).await {
            let mut result = format!("🗑️ Removed **{}** from your cart.\n\n", item.name);
            let _ = writeln!(result, "Removed: {}x {}", item.quantity, item.name);
            let _ = writeln!(result, "Saved: ${:.2}\n", item.line_total());
            result.push_str("Would you like to continue shopping or view your updated cart?");
            result
        } else {
            format!(
                "Sorry, I couldn't remove {} from your cart. Please try again later.",
                item.name
            )
        }
    }
}

pub struct UpdateCartQuantity {
    api: Arc<dyn BackendApi>,
}

impl UpdateCartQuantity {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for UpdateCartQuantity {
    fn name(&self) -> &'static str {
        "update_cart_quantity"
    }

    fn description(&self) -> &'static str {
        "Update the quantity of an item in the shopping cart."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "cart_item_id": {
                    "type": "integer",
                    "description": "The ID of the cart item to update"
                },
                "new_quantity": {
                    "type": "integer",
                    "description": "The new quantity for the item"
                }
            },
            "required": ["cart_item_id", "new_quantity"]
        })
    }

    async fn execute(&self, input: Value) -> String {
        let (Some(cart_item_id), Some(new_quantity)) =
            (int_arg(&input, "cart_item_id"), int_arg(&input, "new_quantity"))
        else {
            return "I need a cart item ID and a new quantity to update.".to_string();
        };

        if new_quantity <= 0 {
            return "Quantity must be a positive number. To remove an item completely, use the remove_from_cart tool."
                .to_string();
        }
        let new_quantity = new_quantity as u32;

        let cart_items = self.api.get_cart_items().await;
        let Some(item) = find_item(&cart_items, cart_item_id) else {
            return format!(
                "Cart item with ID {cart_item_id} not found. Please check your cart and try again."
            );
        };

        let old_quantity = item.quantity;

        if self.api.update_cart_item(cart_item_id, new_quantity).await {
            let old_total = item.price * f64::from(old_quantity);
            let new_total = item.price * f64::from(new_quantity);
            let difference = new_total - old_total;

            let mut result = format!("📦 Updated **{}** quantity in your cart.\n\n", item.name);
            let _ = writeln!(result, "{} {}", item.emoji, item.name);
            let _ = writeln!(result, "Old quantity: {old_quantity} → New quantity: {new_quantity}");
            let _ = writeln!(result, "Price change: ${difference:+.2}");
            let _ = writeln!(result, "New item total: ${new_total:.2}\n");

            if new_quantity > old_quantity {
                result.push_str("Great choice! Added more items to your cart.");
            } else {
                result.push_str("Updated! Reduced the quantity in your cart.");
            }
            result
        } else {
            format!(
                "Sorry, I couldn't update the quantity for {}. Please try again later.",
                item.name
            )
        }
    }
}

pub struct ClearCart {
    api: Arc<dyn BackendApi>,
}

impl ClearCart {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for ClearCart {
    fn name(&self) -> &'static str {
        "clear_cart"
    }

    fn description(&self) -> &'static str {
        "Remove all items from the shopping cart."
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _input: Value) -> String {
        let cart_items = self.api.get_cart_items().await;

        if cart_items.is_empty() {
            return "Your cart is already empty! Ready to start shopping?".to_string();
        }

        // No bulk-delete endpoint: items go one at a time, and a partial
        // result is reported as such.
        let mut removed_count = 0_usize;
        let mut total_saved = 0.0_f64;

        for item in &cart_items {
            if self.api.remove_from_cart(item.id).await {
                removed_count += 1;
                total_saved += item.line_total();
            }
        }

        if removed_count == cart_items.len() {
            let mut result =
                format!("🗑️ **Cart cleared!** Removed all {removed_count} items.\n\n");
            let _ = writeln!(result, "Items removed: {removed_count}");
            let _ = writeln!(result, "Total value cleared: ${total_saved:.2}\n");
            result.push_str(
                "Your cart is now empty and ready for new items. What would you like to shop for?",
            );
            result
        } else if removed_count > 0 {
            format!(
                "⚠️ **Partially cleared:** Removed {removed_count} out of {} items.\n\nSome items couldn't be removed. Please try again or contact support.",
                cart_items.len()
            )
        } else {
            "Sorry, I couldn't clear your cart. Please try again later.".to_string()
        }
    }
}

fn find_item(cart_items: &[CartItem], cart_item_id: i64) -> Option<&CartItem> {
    cart_items.iter().find(|item| item.id == cart_item_id)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use serde_json::json;

    use super::super::stub::{cart_item, product, ScriptedStore};
    use super::super::Tool;
    use super::{AddToCart, ClearCart, RemoveFromCart, UpdateCartQuantity};

    #[tokio::test]
    async fn add_reports_line_total_from_quantity_and_unit_price() {
        let api = Arc::new(
            ScriptedStore::default()
                .with_products(vec![product(1, "Smartphone", 299.99, "Electronics")]),
        );
        let tool = AddToCart::new(api);

        let reply = tool.execute(json!({ "product_id": 1, "quantity": 2 })).await;
        assert!(reply.starts_with("✅ Added 2x **Smartphone** to your cart!"));
        assert!(reply.contains("💰 $299.99 each"));
        assert!(reply.contains("💵 Total: $599.98"));
    }

    #[tokio::test]
    async fn non_positive_quantity_is_rejected_before_any_backend_call() {
        let api = Arc::new(
            ScriptedStore::default()
                .with_products(vec![product(1, "Smartphone", 299.99, "Electronics")]),
        );
        let tool = AddToCart::new(api.clone());

        let reply = tool.execute(json!({ "product_id": 1, "quantity": 0 })).await;
        assert!(reply.starts_with("Quantity must be a positive number."));
        assert_eq!(api.calls.total(), 0);

        let reply = tool.execute(json!({ "product_id": 1, "quantity": -3 })).await;
        assert!(reply.starts_with("Quantity must be a positive number."));
        assert_eq!(api.calls.total(), 0);
    }

    #[tokio::test]
    async fn add_defaults_to_one_item() {
        let api = Arc::new(
            ScriptedStore::default()
                .with_products(vec![product(1, "Smartphone", 299.99, "Electronics")]),
        );
        let tool = AddToCart::new(api);

        let reply = tool.execute(json!({ "product_id": 1 })).await;
        assert!(reply.contains("📦 Quantity: 1"));
    }

    #[tokio::test]
    async fn rejected_add_is_reported_as_a_backend_apology() {
        let api = Arc::new(
            ScriptedStore::default()
                .with_products(vec![product(1, "Smartphone", 299.99, "Electronics")])
                .failing_adds(),
        );
        let tool = AddToCart::new(api);

        let reply = tool.execute(json!({ "product_id": 1, "quantity": 1 })).await;
        assert_eq!(
            reply,
            "Sorry, I couldn't add Smartphone to your cart. Please try again later."
        );
    }

    #[tokio::test]
    async fn remove_reports_unknown_ids_instead_of_ignoring_them() {
        let api =
            Arc::new(ScriptedStore::default().with_cart(vec![cart_item(5, "Laptop", 999.0, 1)]));
        let tool = RemoveFromCart::new(api.clone());

        let reply = tool.execute(json!({ "cart_item_id": 9 })).await;
        assert_eq!(
            reply,
            "Cart item with ID 9 not found. Please check your cart and try again."
        );
        assert_eq!(api.calls.remove_from_cart.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn remove_reports_the_value_returned_to_the_customer() {
        let api =
            Arc::new(ScriptedStore::default().with_cart(vec![cart_item(5, "Laptop", 999.0, 2)]));
        let tool = RemoveFromCart::new(api);

        let reply = tool.execute(json!({ "cart_item_id": 5 })).await;
        assert!(reply.starts_with("🗑️ Removed **Laptop** from your cart."));
        assert!(reply.contains("Removed: 2x Laptop"));
        assert!(reply.contains("Saved: $1998.00"));
    }

    #[tokio::test]
    async fn update_reports_a_signed_price_delta() {
        let api =
            Arc::new(ScriptedStore::default().with_cart(vec![cart_item(5, "Laptop", 100.0, 2)]));
        let tool = UpdateCartQuantity::new(api.clone());

        let increase = tool.execute(json!({ "cart_item_id": 5, "new_quantity": 3 })).await;
        assert!(increase.contains("Old quantity: 2 → New quantity: 3"));
        assert!(increase.contains("Price change: $+100.00"));
        assert!(increase.contains("New item total: $300.00"));
        assert!(increase.ends_with("Great choice! Added more items to your cart."));

        let decrease = tool.execute(json!({ "cart_item_id": 5, "new_quantity": 1 })).await;
        assert!(decrease.contains("Price change: $-100.00"));
        assert!(decrease.ends_with("Updated! Reduced the quantity in your cart."));
    }

    #[tokio::test]
    async fn update_rejects_non_positive_quantity_without_backend_calls() {
        let api = Arc::new(ScriptedStore::default());
        let tool = UpdateCartQuantity::new(api.clone());

        let reply = tool.execute(json!({ "cart_item_id": 5, "new_quantity": 0 })).await;
        assert!(reply.contains("use the remove_from_cart tool"));
        assert_eq!(api.calls.total(), 0);
    }

    #[tokio::test]
    async fn clear_reports_full_success_with_counts_and_value() {
        let api = Arc::new(ScriptedStore::default().with_cart(vec![
            cart_item(1, "Laptop", 100.0, 1),
            cart_item(2, "Mug", 8.5, 2),
        ]));
        let tool = ClearCart::new(api);

        let reply = tool.execute(json!({})).await;
        assert!(reply.starts_with("🗑️ **Cart cleared!** Removed all 2 items."));
        assert!(reply.contains("Total value cleared: $117.00"));
    }

    #[tokio::test]
    async fn clear_reports_partial_success_with_counts() {
        let api = Arc::new(
            ScriptedStore::default()
                .with_cart(vec![
                    cart_item(1, "Laptop", 100.0, 1),
                    cart_item(2, "Mug", 8.5, 2),
                    cart_item(3, "Lamp", 25.0, 1),
                ])
                .with_removal_budget(1),
        );
        let tool = ClearCart::new(api);

        let reply = tool.execute(json!({})).await;
        assert!(reply.starts_with("⚠️ **Partially cleared:** Removed 1 out of 3 items."));
    }

    #[tokio::test]
    async fn clearing_an_empty_cart_is_a_friendly_noop() {
        let tool = ClearCart::new(Arc::new(ScriptedStore::default()));
        assert_eq!(
            tool.execute(json!({})).await,
            "Your cart is already empty! Ready to start shopping?"
        );
    }
}
