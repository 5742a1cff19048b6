//! Cart error types and the result shape handed to callers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur in cart operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Product descriptor has no usable id.
    #[error("Invalid product: missing product id")]
    InvalidProduct,

    /// Product is not in stock.
    #[error("{0} is out of stock")]
    OutOfStock(String),

    /// Quantity outside the allowed range.
    #[error("Quantity {requested} is out of range (1-{max})")]
    QuantityOutOfRange { requested: i64, max: u32 },

    /// No item with this id.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Unknown discount code.
    #[error("Invalid discount code: {0}")]
    InvalidDiscountCode(String),

    /// Order subtotal is below the code's minimum.
    #[error("{code} requires a minimum order of {minimum}")]
    DiscountMinimumNotMet { code: String, minimum: String },

    /// Persisted state could not be read.
    #[error("Failed to read {key}: {reason}")]
    PersistenceReadFailure { key: String, reason: String },

    /// Snapshot could not be written.
    #[error("Failed to write {key}: {reason}")]
    PersistenceWriteFailure { key: String, reason: String },
}

/// Outcome of a cart operation as seen by the caller.
///
/// Errors never cross the public API as `Err`; they are folded into
/// `success = false` with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    /// Whether the operation took effect.
    pub success: bool,
    /// Message suitable for display.
    pub message: String,
}

impl OperationResult {
    /// Create a successful result.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Create a failed result.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl From<Result<String, CartError>> for OperationResult {
    fn from(result: Result<String, CartError>) -> Self {
        match result {
            Ok(message) => Self::ok(message),
            Err(e) => Self::failed(e.to_string()),
        }
    }
}
