//! Configuration validation

use crate::schema::{RawConfig, RawMenuCategory};
use crate::{MAX_COMPLETION_MINUTES, MAX_SWEEP_INTERVAL_SECS};
use rust_decimal::Decimal;
use std::collections::HashSet;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("orders.completion_after_minutes must be greater than zero")]
    ZeroCompletionTime,

    #[error("orders.completion_after_minutes must be at most {max}, got {value}")]
    CompletionTimeTooLong { value: u64, max: u64 },

    #[error("orders.sweep_interval_seconds must be between 1 and {max}, got {value}")]
    SweepIntervalOutOfRange { value: u64, max: u64 },

    #[error("display.currency_symbol cannot be empty")]
    EmptyCurrencySymbol,

    #[error("Duplicate menu category ID: {0}")]
    DuplicateCategoryId(String),

    #[error("Duplicate menu item ID: {0}")]
    DuplicateItemId(u32),

    #[error("Menu category '{category_id}': {message}")]
    CategoryError {
        category_id: String,
        message: String,
    },

    #[error("Menu item {item_id}: {message}")]
    MenuItemError { item_id: u32, message: String },
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    match config.orders.completion_after_minutes {
        Some(0) => errors.push(ValidationError::ZeroCompletionTime),
        Some(minutes) if minutes > MAX_COMPLETION_MINUTES => {
            errors.push(ValidationError::CompletionTimeTooLong {
                value: minutes,
                max: MAX_COMPLETION_MINUTES,
            });
        }
        _ => {}
    }

    // The sweep must run at least once per minute
    if let Some(secs) = config.orders.sweep_interval_seconds
        && !(1..=MAX_SWEEP_INTERVAL_SECS).contains(&secs)
    {
        errors.push(ValidationError::SweepIntervalOutOfRange {
            value: secs,
            max: MAX_SWEEP_INTERVAL_SECS,
        });
    }

    if let Some(symbol) = &config.display.currency_symbol
        && symbol.trim().is_empty()
    {
        errors.push(ValidationError::EmptyCurrencySymbol);
    }

    if let Some(menu) = &config.menu {
        errors.extend(validate_menu(menu));
    }

    errors
}

/// Validate menu categories and their dishes
pub fn validate_menu(categories: &[RawMenuCategory]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen_categories = HashSet::new();
    let mut seen_items = HashSet::new();

    for category in categories {
        if !seen_categories.insert(category.id.as_str()) {
            errors.push(ValidationError::DuplicateCategoryId(category.id.clone()));
        }

        if category.id.trim().is_empty() {
            errors.push(ValidationError::CategoryError {
                category_id: category.id.clone(),
                message: "id cannot be empty".into(),
            });
        }

        if category.name.trim().is_empty() {
            errors.push(ValidationError::CategoryError {
                category_id: category.id.clone(),
                message: "name cannot be empty".into(),
            });
        }

        for item in &category.items {
            if !seen_items.insert(item.id) {
                errors.push(ValidationError::DuplicateItemId(item.id));
            }

            if item.name.trim().is_empty() {
                errors.push(ValidationError::MenuItemError {
                    item_id: item.id,
                    message: "name cannot be empty".into(),
                });
            }

            if item.price < Decimal::ZERO {
                errors.push(ValidationError::MenuItemError {
                    item_id: item.id,
                    message: format!("price cannot be negative ({})", item.price),
                });
            }
        }
    }

    errors
}
