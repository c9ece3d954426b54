//! Error types for identity and ordering operations

use mrfoods_api::OrderStatus;
use mrfoods_store::StoreError;
use mrfoods_util::{MenuItemId, OrderId, Username};
use thiserror::Error;

/// A sign-up field rule that was violated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("username must be 5 to 10 characters (got {0})")]
    UsernameLength(usize),

    #[error("username must not contain whitespace")]
    UsernameWhitespace,

    #[error("password must be 5 to 15 characters (got {0})")]
    PasswordLength(usize),

    #[error("email address '{0}' is not valid")]
    InvalidEmail(String),

    #[error("full name must be at most 15 words (got {0})")]
    FullNameTooLong(usize),
}

/// Identity failures
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("invalid account details: {}", describe(.0))]
    Validation(Vec<FieldError>),

    #[error("username '{0}' is already taken")]
    DuplicateUsername(Username),

    #[error("email '{0}' is already registered")]
    DuplicateEmail(String),

    #[error("invalid password")]
    InvalidCredentials,

    #[error("no account named '{0}'")]
    UnknownUser(Username),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

pub type AccountResult<T> = Result<T, AccountError>;

/// Cart mutations that would break the quantity bounds
#[derive(Debug, Error)]
pub enum CartError {
    #[error("dish {id} cannot go above {max} plates (asked for {requested})")]
    QuantityTooLarge { id: String, requested: i64, max: u32 },

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

pub type CartResult<T> = Result<T, CartError>;

/// Checkout failures
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("sign in to place an order")]
    NotSignedIn,

    #[error("the cart is empty")]
    EmptyCart,

    #[error("a customer name is required")]
    MissingCustomerName,

    #[error("no dish with id {0} on the menu")]
    UnknownMenuItem(MenuItemId),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

pub type CheckoutResult<T> = Result<T, CheckoutError>;

/// Failures acting on an existing order
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("sign in to manage orders")]
    NotSignedIn,

    #[error("no order {0} for the current user")]
    UnknownOrder(OrderId),

    #[error("order {id} is already {status}")]
    AlreadyFinal { id: OrderId, status: OrderStatus },

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

pub type OrderResult<T> = Result<T, OrderError>;

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
