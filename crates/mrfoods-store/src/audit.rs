//! Audit event types

use chrono::{DateTime, Utc};
use mrfoods_api::OrderStatus;
use mrfoods_util::{OrderId, Username};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Types of audit events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEventType {
    /// Long-running service started
    ServiceStarted,

    /// Long-running service stopped
    ServiceStopped,

    /// New account registered
    AccountCreated { username: Username },

    /// Session activated by sign-in
    SignedIn { username: Username },

    /// Sign-in rejected
    SignInFailed { username: Username, reason: String },

    /// Session cleared
    SignedOut { username: Username },

    /// Order submitted at checkout
    OrderPlaced {
        order_id: OrderId,
        username: Option<Username>,
        total: Decimal,
        plates: u32,
    },

    /// Order status changed
    OrderStatusChanged {
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Ledger emptied
    OrdersCleared { count: usize },

    /// Cart emptied after its contents were ordered
    CartCleared { order_id: OrderId, items: usize },

    /// A slot could not be parsed and was dropped
    CorruptStateDiscarded { slot: String, error: String },
}

/// Full audit event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub id: i64,

    /// Event timestamp
    pub timestamp: DateTime<Utc>,

    /// Event type and details
    pub event: AuditEventType,
}

impl AuditEvent {
    pub fn new(event: AuditEventType) -> Self {
        Self {
            id: 0, // Will be set by store
            timestamp: mrfoods_util::now(),
            event,
        }
    }
}
