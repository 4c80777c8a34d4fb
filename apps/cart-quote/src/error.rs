//! # API Error Type
//!
//! What a caller of the quote tool sees when pricing fails.
//!
//! ## Serialization
//! ```json
//! {
//!   "code": "INVALID_PROMO_CODE",
//!   "message": "Invalid promo code 'SPRING': code has expired"
//! }
//! ```
//!
//! The `code` is stable and meant for programmatic handling by the checkout
//! flow; the `message` is for display.

use serde::Serialize;
use storefront_core::CoreError;

use crate::config::ConfigError;

/// API error returned by the quote tool.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed quantity or price (400)
    InvalidLineItem,

    /// Line items in different currencies (400)
    CurrencyMismatch,

    /// Promo code rejected (422)
    InvalidPromoCode,

    /// Product id unknown (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Cart limits exceeded (422)
    CartError,

    /// Insufficient stock (409)
    InsufficientStock,

    /// Request document could not be read or parsed (400)
    InvalidRequest,

    /// Tool is misconfigured (500)
    ConfigError,

    /// Internal error (500)
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InvalidRequest, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::InvalidLineItem { .. } => ErrorCode::InvalidLineItem,
            CoreError::CurrencyMismatch { .. } => ErrorCode::CurrencyMismatch,
            CoreError::InvalidPromoCode { .. } => ErrorCode::InvalidPromoCode,
            CoreError::NegativeTotal { .. } => {
                tracing::error!(error = %err, "Inconsistent cart summary");
                return ApiError::internal("Cart could not be priced");
            }
            CoreError::ProductNotFound(_) => ErrorCode::NotFound,
            CoreError::ProductUnavailable(_) => ErrorCode::CartError,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::CartTooLarge { .. } => ErrorCode::CartError,
            CoreError::QuantityTooLarge { .. } => ErrorCode::ValidationError,
            CoreError::ItemNotInCart(_) => ErrorCode::CartError,
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
