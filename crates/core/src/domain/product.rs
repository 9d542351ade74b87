use serde::{Deserialize, Serialize};

/// A catalog product as served by the store backend.
///
/// The field set mirrors the backend's JSON exactly, including the display
/// emoji; prices are the backend's floating-point values and are only ever
/// rendered through two-decimal formatting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub emoji: String,
}

/// A customer review attached to a product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub product_id: i64,
    pub user_name: String,
    pub rating: u8,
    pub comment: String,
}

/// Arithmetic mean of review ratings; `None` when there are no reviews so
/// callers can render a distinct "no reviews yet" branch instead of 0.0.
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let total: u32 = reviews.iter().map(|review| u32::from(review.rating)).sum();
    Some(f64::from(total) / reviews.len() as f64)
}
