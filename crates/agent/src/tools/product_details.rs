use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use carta_backend::BackendApi;
use carta_core::average_rating;
use serde_json::{json, Value};

use super::{int_arg, Tool};

pub struct ProductDetails {
    api: Arc<dyn BackendApi>,
}

impl ProductDetails {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for ProductDetails {
    fn name(&self) -> &'static str {
        "get_product_details"
    }

    fn description(&self) -> &'static str {
        "Get detailed information about a specific product including reviews and ratings."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "product_id": {
                    "type": "integer",
                    "description": "The unique ID of the product to get details for"
                }
            },
            "required": ["product_id"]
        })
    }

    async fn execute(&self, input: Value) -> String {
        let Some(product_id) = int_arg(&input, "product_id") else {
            return "I need a product ID to look up details.".to_string();
        };

        let Some(product) = self.api.get_product_by_id(product_id).await else {
            return format!(
                "Product with ID {product_id} not found. Please check the product ID and try again."
            );
        };

        let reviews = self.api.get_product_reviews(product_id).await;

        let mut result = format!("{} **{}**\n\n", product.emoji, product.name);
        let _ = writeln!(result, "💰 **Price:** ${:.2}", product.price);
        let _ = writeln!(result, "📂 **Category:** {}", product.category);
        let _ = writeln!(result, "📝 **Description:** {}", product.description);
        let _ = writeln!(result, "🆔 **Product ID:** {}\n", product.id);

        match average_rating(&reviews) {
            Some(average) => {
                let _ = writeln!(
                    result,
                    "⭐ **Customer Reviews** (Average: {average:.1}/5 stars, {} reviews):\n",
                    reviews.len()
                );

                for review in &reviews {
                    let rating = usize::from(review.rating.min(5));
                    let stars = "⭐".repeat(rating) + &"☆".repeat(5 - rating);
                    let _ = writeln!(result, "**{}** {stars}", review.user_name);
                    let _ = writeln!(result, "   \"{}\"\n", review.comment);
                }
            }
            None => {
                result.push_str(
                    "📝 **Customer Reviews:** No reviews yet. Be the first to review this product!\n\n",
                );
            }
        }

        let _ = write!(
            result,
            "To add this item to your cart, just ask me to add product {product_id} to your cart!"
        );

        result
    }
}

pub struct CompareProducts {
    api: Arc<dyn BackendApi>,
}

impl CompareProducts {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for CompareProducts {
    fn name(&self) -> &'static str {
        "compare_products"
    }

    fn description(&self) -> &'static str {
        "Compare two products side by side, including prices and customer ratings."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "product_id1": {
                    "type": "integer",
                    "description": "ID of the first product to compare"
                },
                "product_id2": {
                    "type": "integer",
                    "description": "ID of the second product to compare"
                }
            },
            "required": ["product_id1", "product_id2"]
        })
    }

    async fn execute(&self, input: Value) -> String {
        let (Some(product_id1), Some(product_id2)) =
            (int_arg(&input, "product_id1"), int_arg(&input, "product_id2"))
        else {
            return "I need two product IDs to compare.".to_string();
        };

        let Some(product1) = self.api.get_product_by_id(product_id1).await else {
            return format!("Product with ID {product_id1} not found.");
        };
        let Some(product2) = self.api.get_product_by_id(product_id2).await else {
            return format!("Product with ID {product_id2} not found.");
        };

        let reviews1 = self.api.get_product_reviews(product_id1).await;
        let reviews2 = self.api.get_product_reviews(product_id2).await;

        let avg_rating1 = average_rating(&reviews1).unwrap_or(0.0);
        let avg_rating2 = average_rating(&reviews2).unwrap_or(0.0);

        let mut result = String::from("🔍 **Product Comparison**\n\n");

        let _ = writeln!(
            result,
            "**{} {}** vs **{} {}**\n",
            product1.emoji, product1.name, product2.emoji, product2.name
        );

        result.push_str("| Feature | Product 1 | Product 2 |\n");
        result.push_str("|---------|-----------|----------|\n");
        let _ = writeln!(result, "| **Price** | ${:.2} | ${:.2} |", product1.price, product2.price);
        let _ = writeln!(
            result,
            "| **Category** | {} | {} |",
            product1.category, product2.category
        );
        let _ = writeln!(
            result,
            "| **Rating** | {avg_rating1:.1}/5 ({} reviews) | {avg_rating2:.1}/5 ({} reviews) |\n",
            reviews1.len(),
            reviews2.len()
        );

        let _ = writeln!(result, "**{} Description:**\n{}\n", product1.name, product1.description);
        let _ = writeln!(result, "**{} Description:**\n{}\n", product2.name, product2.description);

        if product1.price < product2.price {
            let savings = product2.price - product1.price;
            let _ = writeln!(
                result,
                "💰 **Price Advantage:** {} is ${savings:.2} cheaper!\n",
                product1.name
            );
        } else if product2.price < product1.price {
            let savings = product1.price - product2.price;
            let _ = writeln!(
                result,
                "💰 **Price Advantage:** {} is ${savings:.2} cheaper!\n",
                product2.name
            );
        } else {
            result.push_str("💰 **Price:** Both products have the same price.\n\n");
        }

        if avg_rating1 > avg_rating2 && !reviews1.is_empty() {
            let _ = writeln!(
                result,
                "⭐ **Rating Advantage:** {} has a higher customer rating!\n",
                product1.name
            );
        } else if avg_rating2 > avg_rating1 && !reviews2.is_empty() {
            let _ = writeln!(
                result,
                "⭐ **Rating Advantage:** {} has a higher customer rating!\n",
                product2.name
            );
        }

        result.push_str("Would you like to add either of these products to your cart?");
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::super::stub::{product, review, ScriptedStore};
    use super::super::Tool;
    use super::{CompareProducts, ProductDetails};

    #[tokio::test]
    async fn details_render_mean_rating_to_one_decimal() {
        let api = Arc::new(
            ScriptedStore::default()
                .with_products(vec![product(1, "Smartphone", 299.99, "Electronics")])
                .with_reviews(1, vec![review("Ana", 5), review("Ben", 4)]),
        );
        let tool = ProductDetails::new(api);

        let reply = tool.execute(json!({ "product_id": 1 })).await;
        assert!(reply.contains("💰 **Price:** $299.99"));
        assert!(reply.contains("(Average: 4.5/5 stars, 2 reviews)"));
        assert!(reply.contains("**Ana** ⭐⭐⭐⭐⭐"));
        assert!(reply.contains("**Ben** ⭐⭐⭐⭐☆"));
        assert!(reply.ends_with("just ask me to add product 1 to your cart!"));
    }

    #[tokio::test]
    async fn zero_reviews_renders_the_no_reviews_branch() {
        let api = Arc::new(
            ScriptedStore::default()
                .with_products(vec![product(1, "Smartphone", 299.99, "Electronics")]),
        );
        let tool = ProductDetails::new(api);

        let reply = tool.execute(json!({ "product_id": 1 })).await;
        assert!(reply.contains("No reviews yet. Be the first to review this product!"));
        assert!(!reply.contains("0.0/5"));
    }

    #[tokio::test]
    async fn unknown_product_is_reported_by_id() {
        let api = Arc::new(ScriptedStore::default());
        let tool = ProductDetails::new(api);

        let reply = tool.execute(json!({ "product_id": 42 })).await;
        assert_eq!(
            reply,
            "Product with ID 42 not found. Please check the product ID and try again."
        );
    }

    #[tokio::test]
    async fn comparison_declares_price_advantage_only_when_prices_differ() {
        let api = Arc::new(ScriptedStore::default().with_products(vec![
            product(1, "Smartphone", 250.0, "Electronics"),
            product(2, "Laptop", 999.0, "Electronics"),
        ]));
        let tool = CompareProducts::new(api);

        let reply = tool.execute(json!({ "product_id1": 1, "product_id2": 2 })).await;
        assert!(reply.contains("**Price Advantage:** Smartphone is $749.00 cheaper!"));
    }

    #[tokio::test]
    async fn equal_prices_report_no_advantage() {
        let api = Arc::new(ScriptedStore::default().with_products(vec![
            product(1, "Smartphone", 250.0, "Electronics"),
            product(2, "Laptop", 250.0, "Electronics"),
        ]));
        let tool = CompareProducts::new(api);

        let reply = tool.execute(json!({ "product_id1": 1, "product_id2": 2 })).await;
        assert!(reply.contains("Both products have the same price."));
        assert!(!reply.contains("Price Advantage"));
    }

    #[tokio::test]
    async fn rating_advantage_requires_at_least_one_review() {
        let api = Arc::new(
            ScriptedStore::default()
                .with_products(vec![
                    product(1, "Smartphone", 250.0, "Electronics"),
                    product(2, "Laptop", 999.0, "Electronics"),
                ])
                .with_reviews(2, vec![review("Cara", 4)]),
        );
        let tool = CompareProducts::new(api);

        let reply = tool.execute(json!({ "product_id1": 1, "product_id2": 2 })).await;
        assert!(reply.contains("**Rating Advantage:** Laptop has a higher customer rating!"));

        // Neither product reviewed: no advantage either way.
        let unreviewed = Arc::new(ScriptedStore::default().with_products(vec![
            product(1, "Smartphone", 250.0, "Electronics"),
            product(2, "Laptop", 999.0, "Electronics"),
        ]));
        let tool = CompareProducts::new(unreviewed);
        let reply = tool.execute(json!({ "product_id1": 1, "product_id2": 2 })).await;
        assert!(!reply.contains("Rating Advantage"));
    }

    #[tokio::test]
    async fn missing_second_product_is_reported_by_id() {
        let api = Arc::new(
            ScriptedStore::default()
                .with_products(vec![product(1, "Smartphone", 250.0, "Electronics")]),
        );
        let tool = CompareProducts::new(api);

        let reply = tool.execute(json!({ "product_id1": 1, "product_id2": 7 })).await;
        assert_eq!(reply, "Product with ID 7 not found.");
    }
}
