//! Data model for mrfoods
//!
//! This crate defines the records every other crate agrees on, and their
//! persisted JSON shape:
//! - Accounts (durable registered users, the active session)
//! - Cart items and cart state
//! - Orders and order status
//! - The menu catalog

mod account;
mod cart;
mod menu;
mod order;

pub use account::*;
pub use cart::*;
pub use menu::*;
pub use order::*;
