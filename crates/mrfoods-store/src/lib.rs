//! Persistence layer for mrfoods
//!
//! Provides:
//! - Named state slots holding JSON text (`user`, `users`, `cartState`, `ordersState`)
//! - Typed load/save on top of the slots, with corrupt-slot discarding
//! - Audit log (append-only)
//! - SQLite and in-memory backends

mod audit;
mod memory;
mod sqlite;
mod traits;

pub use audit::*;
pub use memory::*;
pub use sqlite::*;
pub use traits::*;

use std::fmt;
use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Corrupt state in slot '{slot}': {message}")]
    Corrupt { slot: Slot, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One named slot of durable state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The active session (an account record), absent when signed out
    User,
    /// Every registered account
    Users,
    /// Cart contents and the open flag
    Cart,
    /// The order ledger
    Orders,
}

impl Slot {
    pub const ALL: [Slot; 4] = [Slot::User, Slot::Users, Slot::Cart, Slot::Orders];

    /// Key under which the slot is stored
    pub fn key(self) -> &'static str {
        match self {
            Slot::User => "user",
            Slot::Users => "users",
            Slot::Cart => "cartState",
            Slot::Orders => "ordersState",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
