//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError        - Pricing and cart rule violations               │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  cart-quote errors (app)                                               │
//! │  └── ApiError         - What the caller sees (code + message)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → JSON response          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these errors are transient. Every one is reported to the caller
//! as a rejected request and nothing is retried.

use thiserror::Error;

use crate::money::{Currency, Money};

// =============================================================================
// Core Error
// =============================================================================

/// Pricing and cart errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A line item has a quantity below 1, a negative price, or a line total
    /// that does not fit in i64.
    #[error("Invalid line item {product_id}: {reason}")]
    InvalidLineItem { product_id: String, reason: String },

    /// Line items in one cart carry different currencies.
    ///
    /// ## When This Occurs
    /// ```text
    /// items[0].currency = EUR
    /// items[3].currency = USD   ◄── first disagreeing item
    ///      │
    ///      ▼
    /// CurrencyMismatch { expected: EUR, found: USD, product_id: "..." }
    /// ```
    #[error("Currency mismatch on {product_id}: expected {expected}, found {found}")]
    CurrencyMismatch {
        product_id: String,
        expected: Currency,
        found: Currency,
    },

    /// The promo validator rejected the code.
    #[error("Invalid promo code '{code}': {reason}")]
    InvalidPromoCode { code: String, reason: String },

    /// A summary whose total would be negative.
    ///
    /// Totals are clamped at zero, so this only fires if a summary is
    /// assembled by hand with inconsistent parts.
    #[error("Total would be negative: subtotal {subtotal}, vat {vat}, discount {discount}")]
    NegativeTotal {
        subtotal: Money,
        vat: Money,
        discount: Money,
    },

    /// Product id has no catalog entry.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Product exists but is not for sale.
    #[error("Product is not available for sale: {0}")]
    ProductUnavailable(String),

    /// Not enough stock to satisfy the requested quantity.
    #[error("Insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Cart has reached the maximum number of distinct items.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Product is not in the cart.
    #[error("Product {0} not in cart")]
    ItemNotInCart(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Shorthand for an `InvalidLineItem` error.
    pub fn invalid_line_item(product_id: &str, reason: impl Into<String>) -> Self {
        CoreError::InvalidLineItem {
            product_id: product_id.to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (currency code, decimal rate).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: "mug-01".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for mug-01: available 3, requested 5"
        );

        let err = CoreError::invalid_line_item("mug-01", "quantity must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid line item mug-01: quantity must be at least 1"
        );
    }

    #[test]
    fn test_currency_mismatch_message() {
        let err = CoreError::CurrencyMismatch {
            product_id: "mug-01".to_string(),
            expected: Currency::parse("EUR").unwrap(),
            found: Currency::parse("USD").unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Currency mismatch on mug-01: expected EUR, found USD"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "productId".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
