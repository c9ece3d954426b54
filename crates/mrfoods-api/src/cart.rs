//! Cart items and the persisted cart shape

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A quantity of one menu item pending purchase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Menu item id in its string form
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
}

impl CartItem {
    /// `price * quantity`
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Cart contents as stored in the `cartState` slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total: Decimal,
    #[serde(default)]
    pub is_open: bool,
}

impl CartState {
    /// Sum of line totals, independent of the cached `total`
    pub fn computed_total(&self) -> Decimal {
        self.items
            .iter()
            .map(CartItem::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Number of plates across all entries, capped at `u32::MAX`
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |plates, item| plates.saturating_add(item.quantity))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price: i64, quantity: u32) -> CartItem {
        CartItem {
            id: id.into(),
            name: format!("item {id}"),
            price: Decimal::from(price),
            quantity,
            image: String::new(),
            category: "Fast Food".into(),
        }
    }

    #[test]
    fn totals_and_counts() {
        let state = CartState {
            items: vec![item("7", 149, 2), item("9", 99, 1)],
            total: Decimal::ZERO,
            is_open: false,
        };
        assert_eq!(state.computed_total(), Decimal::from(397));
        assert_eq!(state.item_count(), 3);
    }

    #[test]
    fn plate_count_saturates() {
        let state = CartState {
            items: vec![item("7", 149, u32::MAX), item("9", 99, 3)],
            total: Decimal::ZERO,
            is_open: false,
        };
        assert_eq!(state.item_count(), u32::MAX);
        assert_eq!(
            state.computed_total(),
            Decimal::from(149u64 * u64::from(u32::MAX) + 297)
        );
    }

    #[test]
    fn persisted_shape_uses_camel_case_and_numbers() {
        let state = CartState {
            items: vec![item("7", 149, 1)],
            total: Decimal::from(149),
            is_open: true,
        };
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["isOpen"], serde_json::Value::Bool(true));
        assert!(value["total"].is_number());
        assert!(value["items"][0]["price"].is_number());
    }

    #[test]
    fn parses_integer_prices_from_older_layout() {
        let json = r#"{"items":[{"id":"7","name":"Classic Burger","price":149,"quantity":2,
                       "image":"/images/classic-burger.png","category":"Fast Food"}],
                       "total":298,"isOpen":false}"#;
        let state: CartState = serde_json::from_str(json).unwrap();
        assert_eq!(state.items[0].id, "7");
        assert_eq!(state.items[0].quantity, 2);
        assert_eq!(state.total, Decimal::from(298));
    }
}
