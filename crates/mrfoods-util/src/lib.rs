//! Shared utilities for mrfoods
//!
//! This crate provides:
//! - ID types (OrderId, MenuItemId, Username)
//! - Time utilities (mockable wall clock, unix-millis helpers)
//! - Default paths for config and data directories

mod ids;
mod paths;
mod time;

pub use ids::*;
pub use paths::*;
pub use time::*;
