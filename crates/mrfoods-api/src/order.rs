//! Orders and the order status state machine

use chrono::{DateTime, Utc};
use mrfoods_util::{OrderId, Username, elapsed_since_millis};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::CartItem;

/// Order line: a snapshot of a cart entry taken at checkout
pub type OrderItem = CartItem;

/// Order lifecycle status
///
/// `Pending -> Completed` happens on the promotion sweep, `Pending -> Cancelled`
/// on explicit cancellation. `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }

    /// Whether the state machine allows moving from `self` to `next`.
    /// Re-asserting the current status is always allowed.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        self == next || self == OrderStatus::Pending
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A placed order. `id`, `items` and `total` are fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// Creation timestamp, serialized as ISO-8601
    pub date: DateTime<Utc>,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub status: OrderStatus,
    /// Unix millis used for automatic completion; absent on very old records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<Username>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
}

impl Order {
    /// Build a pending order from a snapshot of items. The total is
    /// computed from the snapshot.
    pub fn pending(
        id: OrderId,
        placed_at: DateTime<Utc>,
        items: Vec<OrderItem>,
        username: Username,
        customer_name: impl Into<String>,
    ) -> Self {
        let total = items
            .iter()
            .map(CartItem::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add);
        Self {
            id,
            date: placed_at,
            items,
            total,
            status: OrderStatus::Pending,
            order_time: Some(placed_at.timestamp_millis()),
            username: Some(username),
            customer_name: Some(customer_name.into()),
        }
    }

    /// True when this order is pending and at least `after` has elapsed
    /// since `order_time`.
    pub fn is_due_for_completion(&self, now: &DateTime<Utc>, after: Duration) -> bool {
        match (self.status, self.order_time) {
            (OrderStatus::Pending, Some(order_time)) => {
                elapsed_since_millis(order_time, now) >= after
            }
            _ => false,
        }
    }

    pub fn belongs_to(&self, username: &Username) -> bool {
        self.username.as_ref() == Some(username)
    }

    /// Number of plates in the order, capped at `u32::MAX`
    pub fn plate_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |plates, item| plates.saturating_add(item.quantity))
    }
}

/// Order ledger as stored in the `ordersState` slot, most recent first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdersState {
    #[serde(default)]
    pub orders: Vec<Order>,
}
