//! # Domain Types
//!
//! Records that flow through the pricing engine.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    LineItem     │   │   CartSummary   │   │   PromoResult   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  product_id     │   │  subtotal       │   │  discount       │       │
//! │  │  quantity       │   │  vat            │   └─────────────────┘       │
//! │  │  unit_price     │   │  discount       │                             │
//! │  │  currency       │   │  total          │   ┌─────────────────┐       │
//! │  └─────────────────┘   │  currency       │   │    VatRate      │       │
//! │                        └─────────────────┘   │  bps (u32)      │       │
//! │                                              │  2000 = 0.20    │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `CartSummary` is derived. It is built fresh on every request and never
//! stored on its own.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{Currency, Money, BPS_SCALE};
use crate::{DEFAULT_CURRENCY, DEFAULT_VAT_RATE_BPS, MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// VAT Rate
// =============================================================================

/// VAT rate in basis points (1 bp = 0.01%).
///
/// The store runs a single fixed rate; there are no per-product tax classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VatRate(u32);

impl VatRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        VatRate(bps)
    }

    /// Parses a decimal fraction such as `"0.20"` or `"0.055"`.
    ///
    /// Parsing is done on the digits directly, so `"0.2"` is exactly 2000
    /// bps. At most four fractional digits are accepted and the rate must
    /// lie between 0 and 1 inclusive.
    ///
    /// ```rust
    /// use storefront_core::types::VatRate;
    ///
    /// assert_eq!(VatRate::parse_decimal("0.20").unwrap().bps(), 2000);
    /// assert_eq!(VatRate::parse_decimal("0.055").unwrap().bps(), 550);
    /// assert_eq!(VatRate::parse_decimal("1").unwrap().bps(), 10000);
    /// assert!(VatRate::parse_decimal("0.12345").is_err());
    /// assert!(VatRate::parse_decimal("1.5").is_err());
    /// ```
    pub fn parse_decimal(input: &str) -> Result<Self, ValidationError> {
        let input = input.trim();
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "vat_rate".to_string(),
            reason: reason.to_string(),
        };

        if input.is_empty() {
            return Err(ValidationError::Required {
                field: "vat_rate".to_string(),
            });
        }

        let (whole, fraction) = match input.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (input, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("expected a decimal such as 0.20"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("expected a decimal such as 0.20"));
        }
        if fraction.len() > 4 {
            return Err(invalid("at most four fractional digits"));
        }

        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| invalid("expected a decimal such as 0.20"))?
        };
        let padded = format!("{:0<4}", fraction);
        let fraction: u64 = padded
            .parse()
            .map_err(|_| invalid("expected a decimal such as 0.20"))?;

        let bps = whole
            .checked_mul(BPS_SCALE as u64)
            .and_then(|w| w.checked_add(fraction))
            .ok_or_else(|| invalid("rate is too large"))?;

        if bps > BPS_SCALE as u64 {
            return Err(ValidationError::OutOfRange {
                field: "vat_rate".to_string(),
                min: 0,
                max: 1,
            });
        }

        Ok(VatRate(bps as u32))
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        VatRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for VatRate {
    fn default() -> Self {
        VatRate(DEFAULT_VAT_RATE_BPS)
    }
}

impl fmt::Display for VatRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:04}", self.0 / 10_000, self.0 % 10_000)
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One row of a cart: a product, how many, and the unit price captured when
/// it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Opaque catalog key.
    pub product_id: String,

    /// Must be at least 1.
    pub quantity: i64,

    /// Unit price in minor units, never negative.
    #[serde(rename = "unitPriceMinorUnits")]
    pub unit_price: Money,

    pub currency: Currency,
}

impl LineItem {
    pub fn new(product_id: impl Into<String>, quantity: i64, unit_price: Money, currency: Currency) -> Self {
        LineItem {
            product_id: product_id.into(),
            quantity,
            unit_price,
            currency,
        }
    }

    /// Unit price × quantity, after checking the item is well formed.
    pub fn line_total(&self) -> CoreResult<Money> {
        if self.quantity < 1 {
            return Err(CoreError::invalid_line_item(
                &self.product_id,
                format!("quantity must be at least 1, got {}", self.quantity),
            ));
        }
        if self.unit_price.is_negative() {
            return Err(CoreError::invalid_line_item(
                &self.product_id,
                format!("unit price must not be negative, got {}", self.unit_price.minor_units()),
            ));
        }

        self.unit_price
            .checked_mul_quantity(self.quantity)
            .ok_or_else(|| CoreError::invalid_line_item(&self.product_id, "line total overflows"))
    }
}

// =============================================================================
// Promo Result
// =============================================================================

/// Discount granted by the promo validator for one code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PromoResult {
    #[serde(rename = "discountMinorUnits")]
    pub discount: Money,
}

impl PromoResult {
    #[inline]
    pub const fn new(discount: Money) -> Self {
        PromoResult { discount }
    }

    #[inline]
    pub const fn none() -> Self {
        PromoResult {
            discount: Money::zero(),
        }
    }
}

// =============================================================================
// Cart Summary
// =============================================================================

/// Priced snapshot of a cart.
///
/// VAT is charged on the undiscounted subtotal, and the discount is taken
/// off afterwards:
///
/// ```text
/// total = max(0, subtotal + vat - discount)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub subtotal: Money,
    pub vat: Money,
    pub discount: Money,
    pub total: Money,
    pub currency: Currency,

    /// VAT rate the summary was priced at.
    pub vat_rate: VatRate,

    /// Normalised code that produced `discount`, if any.
    pub promo_code: Option<String>,

    /// Number of distinct line items.
    pub item_count: usize,

    /// Sum of quantities.
    pub total_quantity: i64,
}

impl CartSummary {
    /// Checks that the summary is internally consistent.
    ///
    /// ## Checks
    /// - discount lies in `0..=subtotal`
    /// - `total == subtotal + vat - discount` and is not negative
    pub fn verify(&self) -> CoreResult<()> {
        if self.discount.is_negative() || self.discount > self.subtotal {
            return Err(CoreError::InvalidPromoCode {
                code: self.promo_code.clone().unwrap_or_default(),
                reason: format!(
                    "discount {} outside 0..={}",
                    self.discount, self.subtotal
                ),
            });
        }

        let raw = self.subtotal.minor_units() as i128 + self.vat.minor_units() as i128
            - self.discount.minor_units() as i128;
        if raw < 0 || self.total.is_negative() {
            return Err(CoreError::NegativeTotal {
                subtotal: self.subtotal,
                vat: self.vat,
                discount: self.discount,
            });
        }

        if raw <= i64::MAX as i128 {
            debug_assert_eq!(raw, self.total.minor_units() as i128);
        }
        Ok(())
    }
}

// =============================================================================
// Pricing Configuration
// =============================================================================

/// Store-wide pricing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingConfig {
    pub vat_rate: VatRate,

    /// Currency reported for empty carts and required of products added
    /// to an empty cart.
    pub currency: Currency,

    pub max_cart_items: usize,

    pub max_item_quantity: i64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        PricingConfig {
            vat_rate: VatRate::default(),
            currency: Currency(DEFAULT_CURRENCY.to_string()),
            max_cart_items: MAX_CART_ITEMS,
            max_item_quantity: MAX_ITEM_QUANTITY,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
