//! Request document handling.
//!
//! ## Request
//! ```json
//! {
//!   "items": [
//!     { "productId": "mug-01", "quantity": 2, "unitPriceMinorUnits": 1250, "currency": "EUR" }
//!   ],
//!   "promoCode": "WELCOME"
//! }
//! ```
//!
//! A stored cart document (`appliedPromoCode`, `discountMinorUnits`) is
//! accepted as well; the stored discount is ignored and re-quoted.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use storefront_core::pricing::price_items;
use storefront_core::{
    CartSummary, InMemoryPromoValidator, LineItem, PricingConfig, PromoValidator,
};
use tracing::info;

use crate::config::ConfigError;
use crate::error::ApiError;

/// A cart to price.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub items: Vec<LineItem>,

    #[serde(default, alias = "appliedPromoCode")]
    pub promo_code: Option<String>,
}

/// Parses `input` and prices it.
pub fn quote<V>(input: &str, config: &PricingConfig, validator: &V) -> Result<CartSummary, ApiError>
where
    V: PromoValidator + ?Sized,
{
    let request: QuoteRequest = serde_json::from_str(input)
        .map_err(|e| ApiError::invalid_request(format!("Invalid cart document: {}", e)))?;

    let summary = price_items(
        &request.items,
        request.promo_code.as_deref(),
        config,
        validator,
    )?;

    info!(
        items = summary.item_count,
        total = %summary.total,
        currency = %summary.currency,
        promo = summary.promo_code.as_deref().unwrap_or("-"),
        "Quote computed"
    );

    Ok(summary)
}

/// Loads the promo rule table, or an empty one when no file is configured.
pub fn load_promotions(path: Option<&Path>) -> Result<InMemoryPromoValidator, ConfigError> {
    let Some(path) = path else {
        return Ok(InMemoryPromoValidator::new());
    };

    let json = fs::read_to_string(path).map_err(|source| ConfigError::PromoFileUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let validator =
        InMemoryPromoValidator::from_json(&json).map_err(|source| ConfigError::PromoFileInvalid {
            path: path.to_path_buf(),
            source,
        })?;

    info!(path = %path.display(), rules = validator.len(), "Promo rules loaded");
    Ok(validator)
}
