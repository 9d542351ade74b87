use std::time::Duration;

use async_trait::async_trait;
use carta_core::{CartItem, CartSummary, Product, Review};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use crate::error::BackendError;

/// Retry parameters for transient transport failures. The defaults mirror
/// the 4-10 second exponential window the service has always used, but they
/// are configurable rather than contractual.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, base_delay_ms: 4_000, max_delay_ms: 10_000 }
    }
}

impl RetryPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(16);
        let multiplier = 1_u64 << exponent;
        let delay_ms = self.base_delay_ms.saturating_mul(multiplier).min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

/// The store operations the assistant's tools depend on.
///
/// Every method degrades on failure instead of propagating it: collections
/// come back empty, lookups come back `None`, mutations come back `false`.
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn get_all_products(&self) -> Vec<Product>;
    async fn get_product_by_id(&self, product_id: i64) -> Option<Product>;
    async fn get_product_reviews(&self, product_id: i64) -> Vec<Review>;
    async fn search_products(&self, query: &str, category: Option<&str>) -> Vec<Product>;
    async fn get_cart_items(&self) -> Vec<CartItem>;
    async fn add_to_cart(&self, product_id: i64, quantity: u32) -> bool;
    async fn update_cart_item(&self, cart_item_id: i64, quantity: u32) -> bool;
    async fn remove_from_cart(&self, cart_item_id: i64) -> bool;
    async fn get_cart_summary(&self) -> CartSummary;
    async fn health_check(&self) -> bool;
}

/// HTTP client for the store backend. Holds one reusable connection pool;
/// safe for concurrent use by any number of in-flight requests.
pub struct BackendClient {
    base_url: String,
    http: Client,
    retry: RetryPolicy,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { base_url, http, retry: RetryPolicy::default() })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// One logical backend call: bounded retries around the transport,
    /// status codes folded into the failure taxonomy.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, BackendError> {
        let mut attempt = 0_u32;
        loop {
            match self.dispatch(method.clone(), path, body).await {
                Ok(value) => return Ok(value),
                Err(failure) if failure.is_transient() && attempt + 1 < self.retry.max_attempts => {
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        path,
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        error = %failure,
                        "transient backend failure; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(failure) => return Err(failure),
            }
        }
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, BackendError> {
        debug!(%method, path, "calling store backend");

        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response =
            request.send().await.map_err(|transport| classify_transport(transport, path))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            warn!(path, "resource not found");
            return Err(BackendError::NotFound { path: path.to_string() });
        }
        if status.is_client_error() || status.is_server_error() {
            error!(path, status = status.as_u16(), "store backend returned an error status");
            return Err(BackendError::Status { status: status.as_u16(), path: path.to_string() });
        }

        response.json::<Value>().await.map_err(|decode_failure| BackendError::Transport {
            path: path.to_string(),
            detail: decode_failure.to_string(),
        })
    }
}

fn classify_transport(transport: reqwest::Error, path: &str) -> BackendError {
    if transport.is_timeout() {
        error!(path, "timeout while calling store backend");
        BackendError::Timeout { path: path.to_string() }
    } else if transport.is_connect() {
        error!(path, "connection failure while calling store backend");
        BackendError::Unavailable { path: path.to_string() }
    } else {
        error!(path, error = %transport, "transport failure while calling store backend");
        BackendError::Transport { path: path.to_string(), detail: transport.to_string() }
    }
}

fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(decode_failure) => {
            error!(what, error = %decode_failure, "unexpected payload shape from store backend");
            None
        }
    }
}

/// Client-side catalog filter: the query matches on substring containment
/// (case-insensitive) in name, description, or category; a category filter
/// is an additional exact case-insensitive match that must also hold.
pub fn filter_products(products: &[Product], query: &str, category: Option<&str>) -> Vec<Product> {
    let query_lower = query.to_lowercase();
    products
        .iter()
        .filter(|product| {
            if let Some(wanted) = category {
                if !product.category.eq_ignore_ascii_case(wanted) {
                    return false;
                }
            }

            product.name.to_lowercase().contains(&query_lower)
                || product.description.to_lowercase().contains(&query_lower)
                || product.category.to_lowercase().contains(&query_lower)
        })
        .cloned()
        .collect()
}

#[async_trait]
impl BackendApi for BackendClient {
    async fn get_all_products(&self) -> Vec<Product> {
        match self.request(Method::GET, "/api/products", None).await {
            Ok(value) => {
                let products: Vec<Product> = decode(value, "products").unwrap_or_default();
                info!(count = products.len(), "retrieved products");
                products
            }
            Err(failure) => {
                error!(error = %failure, "failed to retrieve products");
                Vec::new()
            }
        }
    }

    async fn get_product_by_id(&self, product_id: i64) -> Option<Product> {
        let path = format!("/api/products/{product_id}");
        match self.request(Method::GET, &path, None).await {
            Ok(value) => decode(value, "product"),
            Err(failure) => {
                warn!(product_id, error = %failure, "product lookup failed");
                None
            }
        }
    }

    async fn get_product_reviews(&self, product_id: i64) -> Vec<Review> {
        let path = format!("/api/products/{product_id}/reviews");
        match self.request(Method::GET, &path, None).await {
            Ok(value) => decode(value, "reviews").unwrap_or_default(),
            Err(failure) => {
                warn!(product_id, error = %failure, "review lookup failed");
                Vec::new()
            }
        }
    }

    async fn search_products(&self, query: &str, category: Option<&str>) -> Vec<Product> {
        let all_products = self.get_all_products().await;
        if all_products.is_empty() {
            return Vec::new();
        }

        let matches = filter_products(&all_products, query, category);
        info!(query, count = matches.len(), "catalog search completed");
        matches
    }

    async fn get_cart_items(&self) -> Vec<CartItem> {
        match self.request(Method::GET, "/api/cart", None).await {
            Ok(value) => decode(value, "cart items").unwrap_or_default(),
            Err(failure) => {
                error!(error = %failure, "failed to retrieve cart items");
                Vec::new()
            }
        }
    }

    async fn add_to_cart(&self, product_id: i64, quantity: u32) -> bool {
        let body = json!({ "product_id": product_id, "quantity": quantity });
        match self.request(Method::POST, "/api/cart", Some(&body)).await {
            Ok(_) => {
                info!(product_id, quantity, "added product to cart");
                true
            }
            Err(failure) => {
                error!(product_id, error = %failure, "failed to add product to cart");
                false
            }
        }
    }

    async fn update_cart_item(&self, cart_item_id: i64, quantity: u32) -> bool {
        let path = format!("/api/cart/{cart_item_id}");
        let body = json!({ "quantity": quantity });
        match self.request(Method::PUT, &path, Some(&body)).await {
            Ok(_) => {
                info!(cart_item_id, quantity, "updated cart item quantity");
                true
            }
            Err(failure) => {
                error!(cart_item_id, error = %failure, "failed to update cart item");
                false
            }
        }
    }

    async fn remove_from_cart(&self, cart_item_id: i64) -> bool {
        let path = format!("/api/cart/{cart_item_id}");
        match self.request(Method::DELETE, &path, None).await {
            Ok(_) => {
                info!(cart_item_id, "removed cart item");
                true
            }
            Err(failure) => {
                error!(cart_item_id, error = %failure, "failed to remove cart item");
                false
            }
        }
    }

    async fn get_cart_summary(&self) -> CartSummary {
        CartSummary::from_items(self.get_cart_items().await)
    }

    async fn health_check(&self) -> bool {
        // The product listing doubles as the cheapest "backend is alive" probe.
        match self.request(Method::GET, "/api/products", None).await {
            Ok(_) => true,
            Err(failure) => {
                error!(error = %failure, "store backend health check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use carta_core::Product;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::{filter_products, BackendApi, BackendClient, RetryPolicy};
    use crate::error::BackendError;

    fn product(id: i64, name: &str, category: &str, description: &str) -> Product {
        Product {
            id,
            name: name.to_string(),
            price: 9.99,
            category: category.to_string(),
            description: description.to_string(),
            emoji: String::new(),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, "Smartphone", "Electronics", "A shiny phone"),
            product(2, "Laptop", "Electronics", "Portable computer"),
            product(3, "Coffee Mug", "Home", "Ceramic mug"),
        ]
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy { max_attempts: 3, base_delay_ms: 1, max_delay_ms: 2 }
    }

    async fn spawn_stub(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("stub should bind");
        let address = listener.local_addr().expect("stub should expose its address");

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else { break };
                let mut buffer = [0_u8; 4096];
                let _ = socket.read(&mut buffer).await;
                let response = format!(
                    "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });

        format!("http://{address}")
    }

    fn client_for(base_url: &str) -> BackendClient {
        BackendClient::new(base_url, Duration::from_secs(2))
            .expect("client should build")
            .with_retry_policy(fast_retry())
    }

    #[test]
    fn backoff_doubles_per_attempt_and_caps() {
        let policy = RetryPolicy { max_attempts: 3, base_delay_ms: 4_000, max_delay_ms: 10_000 };
        assert_eq!(policy.backoff(0).as_millis(), 4_000);
        assert_eq!(policy.backoff(1).as_millis(), 8_000);
        assert_eq!(policy.backoff(2).as_millis(), 10_000);
        assert_eq!(policy.backoff(10).as_millis(), 10_000);
    }

    #[test]
    fn query_filter_matches_name_substring_case_insensitively() {
        let matches = filter_products(&catalog(), "phone", None);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "Smartphone");
    }

    #[test]
    fn category_filter_is_an_additional_exact_match() {
        let matches = filter_products(&catalog(), "o", Some("Electronics"));
        let names: Vec<&str> = matches.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Smartphone", "Laptop"]);

        let none = filter_products(&catalog(), "phone", Some("Home"));
        assert!(none.is_empty());
    }

    #[test]
    fn query_matches_description_and_category_fields() {
        let by_description = filter_products(&catalog(), "ceramic", None);
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].name, "Coffee Mug");

        let by_category = filter_products(&catalog(), "home", None);
        assert_eq!(by_category.len(), 1);
    }

    #[tokio::test]
    async fn missing_resource_maps_to_not_found() {
        let base_url = spawn_stub("404 Not Found", "").await;
        let client = client_for(&base_url);

        let failure = client
            .request(reqwest::Method::GET, "/api/products/99", None)
            .await
            .expect_err("404 should fail");
        assert_eq!(failure, BackendError::NotFound { path: "/api/products/99".to_string() });
    }

    #[tokio::test]
    async fn server_error_maps_to_status_failure() {
        let base_url = spawn_stub("500 Internal Server Error", "").await;
        let client = client_for(&base_url);

        let failure = client
            .request(reqwest::Method::GET, "/api/cart", None)
            .await
            .expect_err("500 should fail");
        assert_eq!(failure, BackendError::Status { status: 500, path: "/api/cart".to_string() });
    }

    #[tokio::test]
    async fn successful_call_returns_parsed_json() {
        let base_url = spawn_stub("200 OK", r#"[{"id":1,"product_id":10,"quantity":2,"price":10.99,"name":"Smartphone","emoji":"📱"}]"#).await;
        let client = client_for(&base_url);

        let items = client.get_cart_items().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);

        let summary = client.get_cart_summary().await;
        assert_eq!(summary.total_items, 2);
        assert_eq!(summary.total_cost, 21.98);
        assert!(!summary.empty);
    }

    #[tokio::test]
    async fn refused_connection_degrades_high_level_calls() {
        // Bind to learn a free port, then drop the listener so connections
        // are refused.
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("listener should bind");
        let address = listener.local_addr().expect("listener should expose its address");
        drop(listener);

        let client = client_for(&format!("http://{address}"));

        assert!(client.get_all_products().await.is_empty());
        assert!(client.get_product_by_id(1).await.is_none());
        assert!(!client.add_to_cart(1, 1).await);
        assert!(!client.health_check().await);

        let summary = client.get_cart_summary().await;
        assert!(summary.empty);
    }

    #[tokio::test]
    async fn malformed_payload_degrades_to_empty() {
        let base_url = spawn_stub("200 OK", r#"{"unexpected":"shape"}"#).await;
        let client = client_for(&base_url);

        assert!(client.get_all_products().await.is_empty());
        // The probe only checks that a minimal call succeeds, not its shape.
        assert!(client.health_check().await);
    }
}
