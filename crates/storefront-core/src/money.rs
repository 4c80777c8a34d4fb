//! # Money Module
//!
//! Provides the `Money` and `Currency` types for handling monetary values
//! safely.
//!
//! ## Why Integer Minor Units?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Minor Units                                      │
//! │    €125 000.00 is stored as 12 500 000 cents                            │
//! │    VAT is computed with integer math and one explicit rounding step     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::money::Money;
//!
//! let price = Money::from_minor_units(1099); // 10.99
//! let doubled = price * 2;
//! assert_eq!(doubled.minor_units(), 2198);
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::VatRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents for EUR/USD).
///
/// Signed so that intermediate results such as `subtotal + vat - discount`
/// can be represented before clamping. Money carries no currency of its
/// own; the currency lives on the line item and the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// let price = Money::from_minor_units(1099);
    /// assert_eq!(price.minor_units(), 1099);
    /// ```
    #[inline]
    pub const fn from_minor_units(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor_units(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (truncated toward zero).
    #[inline]
    pub const fn major_part(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns `self` if non-negative, zero otherwise.
    #[inline]
    pub fn floor_at_zero(self) -> Self {
        Money(self.0.max(0))
    }

    /// Multiplies by a quantity, returning `None` on overflow.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// let unit = Money::from_minor_units(299);
    /// assert_eq!(unit.checked_mul_quantity(3), Some(Money::from_minor_units(897)));
    /// assert_eq!(Money::from_minor_units(i64::MAX).checked_mul_quantity(2), None);
    /// ```
    #[inline]
    pub fn checked_mul_quantity(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Adds two values, returning `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Calculates VAT on this amount, rounding half up to the nearest minor
    /// unit.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    /// use storefront_core::types::VatRate;
    ///
    /// let subtotal = Money::from_minor_units(1000);
    /// let rate = VatRate::from_bps(825); // 8.25%
    ///
    /// // 1000 × 8.25% = 82.5 → 83
    /// assert_eq!(subtotal.calculate_vat(rate).minor_units(), 83);
    /// ```
    pub fn calculate_vat(&self, rate: VatRate) -> Money {
        self.apply_bps(rate.bps())
    }

    /// Takes `bps` basis points of this amount, rounding half up.
    pub fn apply_bps(&self, bps: u32) -> Money {
        // i128 keeps amount × bps from overflowing for any i64 amount
        let scaled = self.0 as i128 * bps as i128;
        let rounded = round_half_up(scaled, BPS_SCALE);
        Money(rounded.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }
}

/// Basis points per whole (10 000 bps = 100%).
pub const BPS_SCALE: i128 = 10_000;

/// Divides `numerator` by a positive `denominator`, rounding to the nearest
/// integer with ties going up (toward positive infinity).
///
/// When `numerator` is an exact multiple of `denominator` the result is the
/// exact quotient, so rounding an already-rounded value is a no-op.
///
/// ```rust
/// use storefront_core::money::round_half_up;
///
/// assert_eq!(round_half_up(825, 10), 83);  // 82.5  → 83
/// assert_eq!(round_half_up(824, 10), 82);  // 82.4  → 82
/// assert_eq!(round_half_up(-825, 10), -82); // -82.5 → -82
/// assert_eq!(round_half_up(830, 10), 83);  // exact
/// ```
pub fn round_half_up(numerator: i128, denominator: i128) -> i128 {
    debug_assert!(denominator > 0);
    let quotient = numerator.div_euclid(denominator);
    let remainder = numerator.rem_euclid(denominator);
    if remainder * 2 >= denominator {
        quotient + 1
    } else {
        quotient
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the value as `major.minor` for logs. UI formatting is the
/// frontend's job.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major_part().abs(), self.minor_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Currency
// =============================================================================

/// ISO-4217 alphabetic currency code, e.g. `EUR`.
///
/// Always exactly three ASCII uppercase letters. Deserialisation goes
/// through [`Currency::parse`], so an invalid code in a JSON document is
/// rejected at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, TS)]
#[ts(export)]
pub struct Currency(pub(crate) String);

impl Currency {
    /// Parses a currency code. Surrounding whitespace is ignored and
    /// lowercase input is accepted.
    ///
    /// ```rust
    /// use storefront_core::money::Currency;
    ///
    /// assert_eq!(Currency::parse(" eur ").unwrap().code(), "EUR");
    /// assert!(Currency::parse("EURO").is_err());
    /// assert!(Currency::parse("E1R").is_err());
    /// ```
    pub fn parse(code: &str) -> Result<Self, ValidationError> {
        let code = code.trim();

        if code.is_empty() {
            return Err(ValidationError::Required {
                field: "currency".to_string(),
            });
        }

        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidFormat {
                field: "currency".to_string(),
                reason: "must be a three-letter ISO-4217 code".to_string(),
            });
        }

        Ok(Currency(code.to_ascii_uppercase()))
    }

    /// Returns the uppercase code.
    #[inline]
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Currency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Currency::parse(&code).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor_units() {
        let money = Money::from_minor_units(1099);
        assert_eq!(money.minor_units(), 1099);
        assert_eq!(money.major_part(), 10);
        assert_eq!(money.minor_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor_units(1099).to_string(), "10.99");
        assert_eq!(Money::from_minor_units(500).to_string(), "5.00");
        assert_eq!(Money::from_minor_units(-550).to_string(), "-5.50");
        assert_eq!(Money::from_minor_units(-5).to_string(), "-0.05");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor_units(1000);
        let b = Money::from_minor_units(500);

        assert_eq!((a + b).minor_units(), 1500);
        assert_eq!((a - b).minor_units(), 500);
        assert_eq!((a * 3).minor_units(), 3000);
        assert_eq!((b - a).floor_at_zero(), Money::zero());

        let sum: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(sum.minor_units(), 2000);
    }

    #[test]
    fn test_checked_arithmetic_overflow() {
        let big = Money::from_minor_units(i64::MAX);
        assert_eq!(big.checked_add(Money::from_minor_units(1)), None);
        assert_eq!(big.checked_mul_quantity(2), None);
        assert_eq!(big.checked_mul_quantity(1), Some(big));
    }

    #[test]
    fn test_vat_calculation_basic() {
        let amount = Money::from_minor_units(12_500_000);
        let rate = VatRate::from_bps(2000);
        assert_eq!(amount.calculate_vat(rate).minor_units(), 2_500_000);
    }

    #[test]
    fn test_vat_rounds_half_up() {
        // 10 × 5% = 0.5 → 1
        assert_eq!(Money::from_minor_units(10).apply_bps(500).minor_units(), 1);
        // 9 × 5% = 0.45 → 0
        assert_eq!(Money::from_minor_units(9).apply_bps(500).minor_units(), 0);
        // 30 × 5% = 1.5 → 2 (half-up, not half-even)
        assert_eq!(Money::from_minor_units(30).apply_bps(500).minor_units(), 2);
        // 50 × 5% = 2.5 → 3
        assert_eq!(Money::from_minor_units(50).apply_bps(500).minor_units(), 3);
    }

    #[test]
    fn test_round_half_up_is_identity_on_whole_values() {
        for value in [-7i128, 0, 1, 83, 2_500_000] {
            assert_eq!(round_half_up(value * BPS_SCALE, BPS_SCALE), value);
            let once = round_half_up(value * 10 + 5, 10);
            assert_eq!(round_half_up(once * 10, 10), once);
        }
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!(Currency::parse("EUR").unwrap().code(), "EUR");
        assert_eq!(Currency::parse("usd").unwrap().code(), "USD");
        assert!(matches!(
            Currency::parse(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            Currency::parse("EU"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(Currency::parse("€UR").is_err());
    }

    #[test]
    fn test_currency_serde() {
        let eur: Currency = serde_json::from_str("\"eur\"").unwrap();
        assert_eq!(eur.code(), "EUR");
        assert_eq!(serde_json::to_string(&eur).unwrap(), "\"EUR\"");
        assert!(serde_json::from_str::<Currency>("\"EURO\"").is_err());
    }
}
