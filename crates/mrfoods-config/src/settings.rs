//! Validated settings structures

use crate::schema::{RawConfig, RawMenuCategory};
use crate::{DEFAULT_COMPLETION_MINUTES, DEFAULT_CURRENCY_SYMBOL, DEFAULT_SWEEP_INTERVAL_SECS};
use mrfoods_api::{Catalog, MenuCategory, MenuItem};
use mrfoods_util::{DATABASE_FILENAME, MenuItemId, default_data_dir};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Storage backend for state slots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// SQLite database file in the data directory
    #[default]
    Sqlite,
    /// Process-local memory; nothing survives exit
    Memory,
}

/// How passwords of new accounts are stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordStorage {
    /// Argon2id PHC string
    #[default]
    Argon2,
    /// Plain text, as the original browser layout did
    Plain,
}

/// Validated settings ready for use by the core
#[derive(Debug, Clone)]
pub struct Settings {
    pub storage: StorageConfig,
    pub orders: OrdersConfig,
    pub accounts: AccountsConfig,
    pub display: DisplayConfig,
    pub catalog: Catalog,
}

impl Settings {
    /// Convert from raw config (after validation). `default_menu` is used
    /// when the config does not define its own.
    pub fn from_raw(raw: RawConfig, default_menu: Vec<RawMenuCategory>) -> Self {
        let menu = raw.menu.unwrap_or(default_menu);

        Self {
            storage: StorageConfig {
                backend: raw.storage.backend.unwrap_or_default(),
                data_dir: raw.storage.data_dir.unwrap_or_else(default_data_dir),
            },
            orders: OrdersConfig {
                completion_after: Duration::from_secs(
                    raw.orders
                        .completion_after_minutes
                        .unwrap_or(DEFAULT_COMPLETION_MINUTES)
                        .saturating_mul(60),
                ),
                sweep_interval: Duration::from_secs(
                    raw.orders
                        .sweep_interval_seconds
                        .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS),
                ),
            },
            accounts: AccountsConfig {
                password_storage: raw.accounts.password_storage.unwrap_or_default(),
            },
            display: DisplayConfig {
                currency_symbol: raw
                    .display
                    .currency_symbol
                    .unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string()),
            },
            catalog: convert_menu(menu),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
}

impl StorageConfig {
    /// Path of the SQLite database file
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILENAME)
    }
}

/// Order lifecycle timing
#[derive(Debug, Clone)]
pub struct OrdersConfig {
    /// Age at which a pending order is completed
    pub completion_after: Duration,
    /// Interval between promotion sweeps
    pub sweep_interval: Duration,
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            completion_after: Duration::from_secs(DEFAULT_COMPLETION_MINUTES * 60),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

/// Account handling
#[derive(Debug, Clone, Default)]
pub struct AccountsConfig {
    pub password_storage: PasswordStorage,
}

/// Presentation settings
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    pub currency_symbol: String,
}

impl DisplayConfig {
    /// Format an amount with the configured symbol: whole amounts without
    /// decimals, fractional amounts with two.
    pub fn format_price(&self, amount: Decimal) -> String {
        if amount.fract().is_zero() {
            format!("{}{}", self.currency_symbol, amount.trunc().normalize())
        } else {
            format!("{}{:.2}", self.currency_symbol, amount)
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

fn convert_menu(categories: Vec<RawMenuCategory>) -> Catalog {
    Catalog::new(
        categories
            .into_iter()
            .map(|c| MenuCategory {
                title: c.title.unwrap_or_else(|| c.name.clone()),
                id: c.id,
                name: c.name,
                items: c
                    .items
                    .into_iter()
                    .map(|i| MenuItem {
                        id: MenuItemId::new(i.id),
                        name: i.name,
                        price: i.price,
                        image: i.image,
                    })
                    .collect(),
            })
            .collect(),
    )
}
