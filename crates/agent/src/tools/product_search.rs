use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use carta_backend::BackendApi;
use carta_core::Product;
use serde_json::{json, Value};

use super::{str_arg, Tool};

/// At most this many matches are rendered; the overflow is reported as a
/// count so the model can suggest narrowing the search.
const MAX_SEARCH_RESULTS: usize = 10;

pub struct SearchProducts {
    api: Arc<dyn BackendApi>,
}

impl SearchProducts {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for SearchProducts {
    fn name(&self) -> &'static str {
        "search_products"
    }

    fn description(&self) -> &'static str {
        "Search for products by name, description, or category. Optionally filter to one category."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search term to find products (e.g., \"smartphone\", \"laptop\", \"coffee\")"
                },
                "category": {
                    "type": "string",
                    "description": "Specific category to filter by (e.g., \"Electronics\", \"Home\", \"Clothing\")"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, input: Value) -> String {
        let Some(query) = str_arg(&input, "query") else {
            return "I need a search term to look for products.".to_string();
        };
        let category = str_arg(&input, "category");

        let products = self.api.search_products(query, category).await;

        if products.is_empty() {
            return match category {
                Some(category) => format!(
                    "No products found matching '{query}' in category '{category}'. Try a different search term or browse other categories."
                ),
                None => format!(
                    "No products found matching '{query}'. Try a different search term or check the spelling."
                ),
            };
        }

        let mut result = format!("Found {} product(s) matching '{query}':\n\n", products.len());

        for product in products.iter().take(MAX_SEARCH_RESULTS) {
            let _ = writeln!(result, "{} **{}** - ${:.2}", product.emoji, product.name, product.price);
            let _ = writeln!(result, "   Category: {}", product.category);
            let _ = writeln!(result, "   Description: {}", product.description);
            let _ = writeln!(result, "   Product ID: {}\n", product.id);
        }

        if products.len() > MAX_SEARCH_RESULTS {
            let _ = writeln!(
                result,
                "... and {} more products. Try a more specific search to narrow results.",
                products.len() - MAX_SEARCH_RESULTS
            );
        }

        result
    }
}

pub struct AllProducts {
    api: Arc<dyn BackendApi>,
}

impl AllProducts {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for AllProducts {
    fn name(&self) -> &'static str {
        "get_all_products"
    }

    fn description(&self) -> &'static str {
        "Get all available products in the store, organized by category."
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _input: Value) -> String {
        let products = self.api.get_all_products().await;

        if products.is_empty() {
            return "No products are currently available in the store.".to_string();
        }

        let mut result = format!("Here are all {} products in our store:\n\n", products.len());

        for (category, category_products) in group_by_category(&products) {
            let _ = writeln!(result, "**{category}** ({} items):", category_products.len());
            for product in category_products {
                let _ = writeln!(
                    result,
                    "  {} {} - ${:.2}",
                    product.emoji, product.name, product.price
                );
            }
            result.push('\n');
        }

        result.push_str("Use the product search tool or ask for specific product details to learn more!");
        result
    }
}

pub struct ProductsByCategory {
    api: Arc<dyn BackendApi>,
}

impl ProductsByCategory {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for ProductsByCategory {
    fn name(&self) -> &'static str {
        "get_products_by_category"
    }

    fn description(&self) -> &'static str {
        "Get all products in a specific category."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "category": {
                    "type": "string",
                    "description": "Category name (e.g., \"Electronics\", \"Clothing\", \"Home\", \"Books\")"
                }
            },
            "required": ["category"]
        })
    }

    async fn execute(&self, input: Value) -> String {
        let Some(category) = str_arg(&input, "category") else {
            return "I need a category name to browse products.".to_string();
        };

        let all_products = self.api.get_all_products().await;

        if all_products.is_empty() {
            return "No products are currently available in the store.".to_string();
        }

        let category_products: Vec<&Product> = all_products
            .iter()
            .filter(|product| product.category.eq_ignore_ascii_case(category))
            .collect();

        if category_products.is_empty() {
            let available = distinct_categories(&all_products).join(", ");
            return format!(
                "No products found in category '{category}'. Available categories: {available}"
            );
        }

        let mut result = format!(
            "Products in **{category}** category ({} items):\n\n",
            category_products.len()
        );

        for product in category_products {
            let _ = writeln!(result, "{} **{}** - ${:.2}", product.emoji, product.name, product.price);
            let _ = writeln!(result, "   {}", product.description);
            let _ = writeln!(result, "   Product ID: {}\n", product.id);
        }

        result
    }
}

fn group_by_category(products: &[Product]) -> Vec<(String, Vec<&Product>)> {
    let mut groups: Vec<(String, Vec<&Product>)> = Vec::new();
    for product in products {
        match groups.iter_mut().find(|(category, _)| *category == product.category) {
            Some((_, members)) => members.push(product),
            None => groups.push((product.category.clone(), vec![product])),
        }
    }
    groups
}

fn distinct_categories(products: &[Product]) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for product in products {
        if !categories.iter().any(|seen| seen == &product.category) {
            categories.push(product.category.clone());
        }
    }
    categories
}
