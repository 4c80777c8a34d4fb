//! # Validation Module
//!
//! Input validation for cart requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront frontend                                          │
//! │  └── Quantity pickers, immediate feedback                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Deserialisation                                              │
//! │  └── Currency codes parsed, numeric types checked                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: THIS MODULE                                                  │
//! │  └── Quantity / price / id / rate / cart size rules                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::BPS_SCALE;
use crate::types::LineItem;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted product id.
pub const MAX_PRODUCT_ID_LEN: usize = 128;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an opaque product id: non-empty after trimming and at most
/// [`MAX_PRODUCT_ID_LEN`] bytes.
///
/// ```rust
/// use storefront_core::validation::validate_product_id;
///
/// assert!(validate_product_id("mug-01").is_ok());
/// assert!(validate_product_id("  ").is_err());
/// ```
pub fn validate_product_id(product_id: &str) -> ValidationResult<()> {
    let product_id = product_id.trim();

    if product_id.is_empty() {
        return Err(ValidationError::Required {
            field: "productId".to_string(),
        });
    }

    if product_id.len() > MAX_PRODUCT_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "productId".to_string(),
            max: MAX_PRODUCT_ID_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity against the store's per-item maximum.
///
/// ```text
/// validate_quantity(qty, max)
///      │
///      ├── qty <= 0?   → MustBePositive
///      ├── qty > max?  → OutOfRange
///      └── OK
/// ```
pub fn validate_quantity(qty: i64, max: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > max {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max,
        });
    }

    Ok(())
}

/// Validates a price in minor units. Zero is allowed (free items).
///
/// ```rust
/// use storefront_core::validation::validate_price_minor_units;
///
/// assert!(validate_price_minor_units(1099).is_ok());
/// assert!(validate_price_minor_units(0).is_ok());
/// assert!(validate_price_minor_units(-100).is_err());
/// ```
pub fn validate_price_minor_units(minor: i64) -> ValidationResult<()> {
    if minor < 0 {
        return Err(ValidationError::OutOfRange {
            field: "unitPriceMinorUnits".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a VAT rate in basis points (0% to 100%).
pub fn validate_vat_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps as i128 > BPS_SCALE {
        return Err(ValidationError::OutOfRange {
            field: "vat_rate".to_string(),
            min: 0,
            max: BPS_SCALE as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates every field of a line item.
///
/// Unlike [`LineItem::line_total`], which only checks what the arithmetic
/// needs, this also applies the store limits on id length and quantity.
pub fn validate_line_item(item: &LineItem, max_quantity: i64) -> ValidationResult<()> {
    validate_product_id(&item.product_id)?;
    validate_quantity(item.quantity, max_quantity)?;
    validate_price_minor_units(item.unit_price.minor_units())?;
    Ok(())
}

/// Validates that one more distinct item fits in the cart.
pub fn validate_cart_size(current_items: usize, max: usize) -> ValidationResult<()> {
    if current_items >= max {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: max as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::{Currency, Money};

    #[test]
    fn test_validate_product_id() {
        assert!(validate_product_id("mug-01").is_ok());
        assert!(validate_product_id("").is_err());
        assert!(validate_product_id(&"x".repeat(MAX_PRODUCT_ID_LEN)).is_ok());
        assert!(matches!(
            validate_product_id(&"x".repeat(MAX_PRODUCT_ID_LEN + 1)),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1, 999).is_ok());
        assert!(validate_quantity(999, 999).is_ok());

        assert!(matches!(
            validate_quantity(0, 999),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(validate_quantity(-1, 999).is_err());
        assert!(matches!(
            validate_quantity(1000, 999),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_vat_rate_bps() {
        assert!(validate_vat_rate_bps(0).is_ok());
        assert!(validate_vat_rate_bps(2000).is_ok());
        assert!(validate_vat_rate_bps(10000).is_ok());
        assert!(validate_vat_rate_bps(10001).is_err());
    }

    #[test]
    fn test_validate_line_item() {
        let eur = Currency::parse("EUR").unwrap();
        let ok = LineItem::new("mug-01", 2, Money::from_minor_units(1250), eur.clone());
        assert!(validate_line_item(&ok, 999).is_ok());

        let too_many = LineItem::new("mug-01", 1000, Money::from_minor_units(1250), eur.clone());
        assert!(validate_line_item(&too_many, 999).is_err());

        let no_id = LineItem::new("", 1, Money::from_minor_units(1250), eur);
        assert!(matches!(
            validate_line_item(&no_id, 999),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(0, 100).is_ok());
        assert!(validate_cart_size(99, 100).is_ok());
        assert!(validate_cart_size(100, 100).is_err());
    }
}
