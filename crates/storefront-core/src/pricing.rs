//! # Cart Pricing Engine
//!
//! Turns line items and an optional promo code into a [`CartSummary`].
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  LineItem[]                                                             │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  compute_subtotal ── qty < 1 / price < 0 ──► InvalidLineItem            │
//! │      │             ── mixed currencies ────► CurrencyMismatch           │
//! │      ▼                                                                  │
//! │  compute_vat(subtotal, rate)      round half up, one fixed rate         │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  apply_promo(subtotal, code) ──── rejected ──► InvalidPromoCode         │
//! │      │                            discount capped at subtotal           │
//! │      ▼                                                                  │
//! │  compute_total = max(0, subtotal + vat - discount)                      │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  CartSummary                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every function here is pure and runs in O(n) over the line items. There is
//! no shared state between calls, so concurrent requests need no locking.

use tracing::{debug, warn};

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::{Currency, Money};
use crate::promo::{normalize_code, PromoValidator};
use crate::types::{CartSummary, LineItem, PricingConfig, PromoResult, VatRate};
use crate::validation::{validate_line_item, validate_vat_rate_bps};

// =============================================================================
// Building Blocks
// =============================================================================

/// Returns the currency shared by all items, or `None` for an empty slice.
///
/// The first item sets the expected currency; the first item that disagrees
/// is reported.
pub fn ensure_single_currency(items: &[LineItem]) -> CoreResult<Option<Currency>> {
    let Some(first) = items.first() else {
        return Ok(None);
    };

    if let Some(other) = items.iter().find(|i| i.currency != first.currency) {
        return Err(CoreError::CurrencyMismatch {
            product_id: other.product_id.clone(),
            expected: first.currency.clone(),
            found: other.currency.clone(),
        });
    }

    Ok(Some(first.currency.clone()))
}

/// Sum of unit price × quantity over all items.
///
/// ## Errors
/// - `InvalidLineItem` if any quantity is below 1, any price is negative, or
///   the sum overflows
/// - `CurrencyMismatch` if the items are not all in one currency
///
/// ```rust
/// use storefront_core::pricing::compute_subtotal;
/// use storefront_core::{Currency, LineItem, Money};
///
/// let eur = Currency::parse("EUR").unwrap();
/// let items = vec![
///     LineItem::new("mug-01", 2, Money::from_minor_units(1250), eur.clone()),
///     LineItem::new("bowl-02", 1, Money::from_minor_units(899), eur),
/// ];
/// assert_eq!(compute_subtotal(&items).unwrap().minor_units(), 3399);
/// ```
pub fn compute_subtotal(items: &[LineItem]) -> CoreResult<Money> {
    let mut subtotal = Money::zero();

    for item in items {
        let line_total = item.line_total()?;
        subtotal = subtotal
            .checked_add(line_total)
            .ok_or_else(|| CoreError::invalid_line_item(&item.product_id, "subtotal overflows"))?;
    }

    ensure_single_currency(items)?;
    Ok(subtotal)
}

/// VAT on `subtotal` at `rate`, rounded half up to a whole minor unit.
pub fn compute_vat(subtotal: Money, rate: VatRate) -> Money {
    subtotal.calculate_vat(rate)
}

/// Asks the validator what `code` is worth and caps the answer at the
/// subtotal.
///
/// The returned discount always lies in `0..=subtotal`, so the engine can
/// never produce a negative pre-VAT amount whatever the validator says.
pub fn apply_promo<V>(
    subtotal: Money,
    code: &str,
    currency: &Currency,
    validator: &V,
) -> CoreResult<PromoResult>
where
    V: PromoValidator + ?Sized,
{
    let code = normalize_code(code).map_err(|e| CoreError::InvalidPromoCode {
        code: code.trim().to_string(),
        reason: e.to_string(),
    })?;

    let granted = validator
        .validate(&code, subtotal, currency)
        .map_err(|rejection| {
            debug!(code = %code, reason = %rejection, "Promo code rejected");
            CoreError::InvalidPromoCode {
                code: code.clone(),
                reason: rejection.to_string(),
            }
        })?;

    let ceiling = subtotal.floor_at_zero();
    let discount = granted.discount.clamp(Money::zero(), ceiling);

    if discount != granted.discount {
        warn!(
            code = %code,
            granted = %granted.discount,
            applied = %discount,
            "Promo discount clamped to subtotal"
        );
    }

    Ok(PromoResult::new(discount))
}

/// `subtotal + vat - discount`, floored at zero.
///
/// Saturates at `i64::MAX`; [`price_items`] rejects carts whose
/// `subtotal + vat` does not fit before it gets here.
pub fn compute_total(subtotal: Money, vat: Money, discount: Money) -> Money {
    let raw = subtotal.minor_units() as i128 + vat.minor_units() as i128
        - discount.minor_units() as i128;
    Money::from_minor_units(raw.clamp(0, i64::MAX as i128) as i64)
}

// =============================================================================
// Full Computation
// =============================================================================

/// Prices a list of line items with at most one promo code.
///
/// A blank code is treated as no code. Store limits from `config` (item
/// count, per-item quantity, rate range) are checked after the arithmetic
/// checks, so malformed items report `InvalidLineItem` first.
///
/// ## Example
/// ```rust
/// use storefront_core::pricing::price_items;
/// use storefront_core::promo::NoPromotions;
/// use storefront_core::{Currency, LineItem, Money, PricingConfig};
///
/// let eur = Currency::parse("EUR").unwrap();
/// let items = vec![LineItem::new("sofa", 1, Money::from_minor_units(12_500_000), eur)];
/// let summary = price_items(&items, None, &PricingConfig::default(), &NoPromotions).unwrap();
///
/// assert_eq!(summary.subtotal.minor_units(), 12_500_000);
/// assert_eq!(summary.vat.minor_units(), 2_500_000);
/// assert_eq!(summary.total.minor_units(), 15_000_000);
/// ```
pub fn price_items<V>(
    items: &[LineItem],
    promo_code: Option<&str>,
    config: &PricingConfig,
    validator: &V,
) -> CoreResult<CartSummary>
where
    V: PromoValidator + ?Sized,
{
    validate_vat_rate_bps(config.vat_rate.bps())?;

    let subtotal = compute_subtotal(items)?;
    let currency = ensure_single_currency(items)?.unwrap_or_else(|| config.currency.clone());

    if items.len() > config.max_cart_items {
        return Err(CoreError::CartTooLarge {
            max: config.max_cart_items,
        });
    }
    for item in items {
        validate_line_item(item, config.max_item_quantity)?;
    }

    let vat = compute_vat(subtotal, config.vat_rate);
    if subtotal.checked_add(vat).is_none() {
        let product_id = items.last().map(|i| i.product_id.as_str()).unwrap_or_default();
        return Err(CoreError::invalid_line_item(product_id, "total overflows"));
    }

    let promo_code = promo_code.map(str::trim).filter(|c| !c.is_empty());
    let (discount, promo_code) = match promo_code {
        Some(code) => {
            let result = apply_promo(subtotal, code, &currency, validator)?;
            (result.discount, Some(code.to_uppercase()))
        }
        None => (Money::zero(), None),
    };

    let total = compute_total(subtotal, vat, discount);

    let summary = CartSummary {
        subtotal,
        vat,
        discount,
        total,
        currency,
        vat_rate: config.vat_rate,
        promo_code,
        item_count: items.len(),
        total_quantity: items.iter().map(|i| i.quantity).sum(),
    };
    summary.verify()?;

    debug!(
        items = summary.item_count,
        subtotal = %summary.subtotal,
        vat = %summary.vat,
        discount = %summary.discount,
        total = %summary.total,
        currency = %summary.currency,
        "Cart priced"
    );

    Ok(summary)
}

/// Prices a cart, re-validating its promo code against the current items.
///
/// The discount stored on the cart is only the last quote; the summary is
/// always computed fresh.
pub fn price_cart<V>(cart: &Cart, config: &PricingConfig, validator: &V) -> CoreResult<CartSummary>
where
    V: PromoValidator + ?Sized,
{
    price_items(
        &cart.items,
        cart.applied_promo_code.as_deref(),
        config,
        validator,
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
