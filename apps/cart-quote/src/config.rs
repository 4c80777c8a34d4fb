//! Quote tool configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults.
//!
//! | Variable                        | Default | Meaning                      |
//! |---------------------------------|---------|------------------------------|
//! | `STOREFRONT_VAT_RATE`           | `0.20`  | VAT rate as a decimal        |
//! | `STOREFRONT_CURRENCY`           | `EUR`   | Store currency (ISO-4217)    |
//! | `STOREFRONT_MAX_CART_ITEMS`     | `100`   | Distinct items per cart      |
//! | `STOREFRONT_MAX_ITEM_QUANTITY`  | `999`   | Quantity per line item       |
//! | `STOREFRONT_PROMO_FILE`         | unset   | JSON array of promo rules    |

use std::path::PathBuf;

use storefront_core::{
    Currency, PricingConfig, VatRate, DEFAULT_CURRENCY, MAX_CART_ITEMS, MAX_ITEM_QUANTITY,
};

/// Quote tool configuration.
#[derive(Debug, Clone)]
pub struct QuoteConfig {
    pub pricing: PricingConfig,

    /// Promo rule table; no file means no promotions.
    pub promo_file: Option<PathBuf>,
}

impl QuoteConfig {
    /// Load configuration through `lookup`, which returns the value of a
    /// variable if it is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vat_rate = VatRate::parse_decimal(
            &lookup("STOREFRONT_VAT_RATE").unwrap_or_else(|| "0.20".to_string()),
        )
        .map_err(|_| ConfigError::InvalidValue("STOREFRONT_VAT_RATE".to_string()))?;

        let currency = Currency::parse(
            &lookup("STOREFRONT_CURRENCY").unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        )
        .map_err(|_| ConfigError::InvalidValue("STOREFRONT_CURRENCY".to_string()))?;

        let max_cart_items: usize = lookup("STOREFRONT_MAX_CART_ITEMS")
            .unwrap_or_else(|| MAX_CART_ITEMS.to_string())
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue("STOREFRONT_MAX_CART_ITEMS".to_string()))?;

        let max_item_quantity: i64 = lookup("STOREFRONT_MAX_ITEM_QUANTITY")
            .unwrap_or_else(|| MAX_ITEM_QUANTITY.to_string())
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue("STOREFRONT_MAX_ITEM_QUANTITY".to_string()))?;

        if max_cart_items == 0 {
            return Err(ConfigError::InvalidValue("STOREFRONT_MAX_CART_ITEMS".to_string()));
        }
        if max_item_quantity < 1 {
            return Err(ConfigError::InvalidValue(
                "STOREFRONT_MAX_ITEM_QUANTITY".to_string(),
            ));
        }

        let promo_file = lookup("STOREFRONT_PROMO_FILE")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(QuoteConfig {
            pricing: PricingConfig {
                vat_rate,
                currency,
                max_cart_items,
                max_item_quantity,
            },
            promo_file,
        })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Cannot read promo file {path}: {source}")]
    PromoFileUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid promo file {path}: {source}")]
    PromoFileInvalid {
        path: PathBuf,
        source: serde_json::Error,
    },
}
