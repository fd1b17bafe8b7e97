//! Cart model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// One cart line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// Line id (uuid) used for targeted updates/removal
    pub id: String,
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    pub quantity: i64,
    pub size: String,
    pub color: String,
    /// Unit price captured at add time
    pub unit_price: f64,
}

/// Per-user cart (one per user, created lazily)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    #[serde(default)]
    pub items: Vec<CartItem>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Cart {
    pub fn empty(user: RecordId, now: i64) -> Self {
        Self {
            id: None,
            user,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Cart total (Σ unit price × quantity)
    pub fn total(&self) -> f64 {
        self.items
            .iter()
            .map(|item| item.unit_price * item.quantity as f64)
            .sum()
    }

    /// Total number of articles across all lines
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Add a line, merging with an existing {product, size, color} triple
    /// by incrementing its quantity instead of duplicating the line.
    pub fn add_line(
        &mut self,
        product: RecordId,
        quantity: i64,
        size: String,
        color: String,
        unit_price: f64,
        now: i64,
    ) {
        let existing = self.items.iter_mut().find(|item| {
            item.product == product && item.size == size && item.color == color
        });

        match existing {
            Some(item) => item.quantity += quantity,
            None => self.items.push(CartItem {
                id: uuid::Uuid::new_v4().to_string(),
                product,
                quantity,
                size,
                color,
                unit_price,
            }),
        }

        self.updated_at = now;
    }

    /// Remove a line by its id; returns whether a line was removed
    pub fn remove_line(&mut self, item_id: &str, now: i64) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != item_id);
        let removed = self.items.len() != before;
        if removed {
            self.updated_at = now;
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(key: &str) -> RecordId {
        RecordId::from_table_key("product", key)
    }

    fn cart() -> Cart {
        Cart::empty(RecordId::from_table_key("user", "u1"), 1000)
    }

    #[test]
    fn test_add_line_merges_matching_triple() {
        let mut cart = cart();
        cart.add_line(pid("p1"), 2, "M".into(), "black".into(), 49.9, 1001);
        cart.add_line(pid("p1"), 1, "M".into(), "black".into(), 49.9, 1002);

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 3);
        assert_eq!(cart.updated_at, 1002);
    }

    #[test]
    fn test_add_line_different_size_is_new_line() {
        let mut cart = cart();
        cart.add_line(pid("p1"), 1, "M".into(), "black".into(), 49.9, 1001);
        cart.add_line(pid("p1"), 1, "L".into(), "black".into(), 49.9, 1002);
        cart.add_line(pid("p1"), 1, "M".into(), "white".into(), 49.9, 1003);

        assert_eq!(cart.items.len(), 3);
    }

    #[test]
    fn test_total_and_count() {
        let mut cart = cart();
        cart.add_line(pid("p1"), 3, "M".into(), "black".into(), 10.0, 1001);
        cart.add_line(pid("p2"), 1, "S".into(), "red".into(), 5.5, 1002);

        assert_eq!(cart.total(), 35.5);
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_remove_line() {
        let mut cart = cart();
        cart.add_line(pid("p1"), 1, "M".into(), "black".into(), 10.0, 1001);
        let id = cart.items[0].id.clone();

        assert!(cart.remove_line(&id, 1002));
        assert!(cart.items.is_empty());
        assert!(!cart.remove_line(&id, 1003));
    }
}
