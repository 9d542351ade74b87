use serde::{Deserialize, Serialize};

/// A line in the shopping cart, as served by the store backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: i64,
    pub product_id: i64,
    pub quantity: u32,
    pub price: f64,
    pub name: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub category: String,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Aggregate view of the cart. An empty cart is an explicit shape
/// (`items=[]`, zero totals, `empty=true`), never a null.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartSummary {
    pub items: Vec<CartItem>,
    pub total_items: u32,
    pub total_cost: f64,
    pub empty: bool,
}

impl CartSummary {
    pub fn from_items(items: Vec<CartItem>) -> Self {
        if items.is_empty() {
            return Self::empty();
        }

        let total_items = items.iter().map(|item| item.quantity).sum();
        let total_cost: f64 = items.iter().map(CartItem::line_total).sum();
        Self { items, total_items, total_cost: round_to_cents(total_cost), empty: false }
    }

    pub fn empty() -> Self {
        Self { items: Vec::new(), total_items: 0, total_cost: 0.0, empty: true }
    }
}

fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::{CartItem, CartSummary};

    fn item(id: i64, price: f64, quantity: u32) -> CartItem {
        CartItem {
            id,
            product_id: id * 10,
            quantity,
            price,
            name: format!("item-{id}"),
            emoji: String::new(),
            category: String::new(),
        }
    }

    #[test]
    fn summary_totals_sum_quantities_and_round_cost() {
        let summary = CartSummary::from_items(vec![item(1, 10.99, 2), item(2, 20.99, 1)]);

        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.total_cost, 42.97);
        assert!(!summary.empty);
        assert_eq!(summary.items.len(), 2);
    }

    #[test]
    fn empty_cart_is_an_explicit_shape() {
        let summary = CartSummary::from_items(Vec::new());

        assert_eq!(summary.total_items, 0);
        assert_eq!(summary.total_cost, 0.0);
        assert!(summary.empty);
        assert!(summary.items.is_empty());
    }

    #[test]
    fn line_total_multiplies_price_by_quantity() {
        assert_eq!(item(1, 2.5, 4).line_total(), 10.0);
    }
}
