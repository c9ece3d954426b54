//! Core events emitted by the stores

use mrfoods_api::OrderStatus;
use mrfoods_util::{OrderId, Username};
use rust_decimal::Decimal;
use std::time::Duration;

/// Events emitted by order operations and the promotion sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// Order submitted
    OrderPlaced {
        order_id: OrderId,
        username: Option<Username>,
        total: Decimal,
        plates: u32,
    },

    /// Order status changed by an explicit request
    OrderStatusChanged {
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Pending order completed by the sweep
    OrderCompleted {
        order_id: OrderId,
        username: Option<Username>,
        waited: Duration,
    },

    /// Ledger emptied
    OrdersCleared {
        count: usize,
    },
}
