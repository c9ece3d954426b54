//! Raw configuration schema (as parsed from TOML)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{PasswordStorage, StorageBackend};

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    #[serde(default)]
    pub storage: RawStorageConfig,

    #[serde(default)]
    pub orders: RawOrdersConfig,

    #[serde(default)]
    pub accounts: RawAccountsConfig,

    #[serde(default)]
    pub display: RawDisplayConfig,

    /// Menu categories. When absent the bundled default menu is used.
    #[serde(default)]
    pub menu: Option<Vec<RawMenuCategory>>,
}

/// Where state slots are persisted
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawStorageConfig {
    /// Storage backend (default: sqlite)
    pub backend: Option<StorageBackend>,

    /// Data directory for the database file
    pub data_dir: Option<PathBuf>,
}

/// Order lifecycle timing
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawOrdersConfig {
    /// Minutes after which a pending order is completed (default: 15)
    pub completion_after_minutes: Option<u64>,

    /// Seconds between promotion sweeps (default: 60, max: 60)
    pub sweep_interval_seconds: Option<u64>,
}

/// Account handling
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawAccountsConfig {
    /// How new passwords are stored (default: argon2)
    pub password_storage: Option<PasswordStorage>,
}

/// Presentation settings shared by every view
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawDisplayConfig {
    /// Currency symbol for prices and totals (default: "₹")
    pub currency_symbol: Option<String>,
}

/// A menu category with its dishes
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawMenuCategory {
    pub id: String,
    pub name: String,
    pub title: Option<String>,
    #[serde(default)]
    pub items: Vec<RawMenuItem>,
}

/// A dish
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawMenuItem {
    pub id: u32,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: String,
}

/// Standalone menu file layout (the bundled default menu)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawMenuFile {
    pub menu: Vec<RawMenuCategory>,
}
