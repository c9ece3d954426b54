//! Ordering core for mrfoods
//!
//! This crate holds the state containers behind the storefront:
//! - Identity (active session, registered accounts, sign-up rules)
//! - Cart (pending purchase set with a derived total)
//! - Orders (ledger filtered to the active user, time-driven completion)
//! - Checkout, composing the three
//! - The recurring promotion task

mod cart;
mod error;
mod events;
mod identity;
mod orders;
mod password;
mod promotion;
mod storefront;

pub use cart::*;
pub use error::*;
pub use events::*;
pub use identity::*;
pub use orders::*;
pub use password::*;
pub use promotion::*;
pub use storefront::*;

use mrfoods_store::{AuditEvent, AuditEventType, Store};
use tracing::warn;

/// Append an audit event; a failing audit log never fails the operation
fn record(store: &dyn Store, event: AuditEventType) {
    if let Err(e) = store.append_audit(AuditEvent::new(event)) {
        warn!(error = %e, "Failed to append audit event");
    }
}
