//! # storefront-core: Cart Pricing for the Storefront
//!
//! This crate holds the pricing logic behind the storefront's cart view and
//! checkout. Everything here is a pure function over its inputs: no database,
//! no network, no clock reads in the pricing path.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Storefront Request Flow                            │
//! │                                                                         │
//! │  Cart storage ──► LineItem[] ──┐                                        │
//! │                                │                                        │
//! │  Promo code ───────────────────┤                                        │
//! │                                ▼                                        │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │             ★ storefront-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   compute_subtotal ──► compute_vat ──► apply_promo ──►          │   │
//! │  │                                          compute_total          │   │
//! │  │                                                                 │   │
//! │  │   PromoValidator (trait)       ProductCatalog (trait)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                ▼                                        │
//! │                          CartSummary ──► checkout / order creation      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money and Currency, integer minor units
//! - [`types`] - Line items, summaries, VAT rate, pricing config
//! - [`pricing`] - Subtotal, VAT, promo and total computation
//! - [`promo`] - Promo validator seam and an in-memory rule table
//! - [`catalog`] - Product catalog seam
//! - [`cart`] - Cart mutations (add, update, remove, promo code)
//! - [`validation`] - Input validation rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::pricing::price_items;
//! use storefront_core::promo::NoPromotions;
//! use storefront_core::{Currency, LineItem, Money, PricingConfig};
//!
//! let eur = Currency::parse("EUR").unwrap();
//! let items = vec![LineItem::new("sku-1", 1, Money::from_minor_units(12_500_000), eur)];
//!
//! let summary = price_items(&items, None, &PricingConfig::default(), &NoPromotions).unwrap();
//! assert_eq!(summary.vat.minor_units(), 2_500_000);
//! assert_eq!(summary.total.minor_units(), 15_000_000);
//! ```

pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod pricing;
pub mod promo;
pub mod types;
pub mod validation;

pub use cart::Cart;
pub use catalog::{CatalogProduct, InMemoryCatalog, ProductCatalog};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Currency, Money};
pub use promo::{InMemoryPromoValidator, NoPromotions, PromoRejection, PromoValidator};
pub use types::*;

/// Default maximum number of distinct line items in a cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Default maximum quantity of a single line item.
///
/// Guards against typos such as 1000 instead of 10.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Default VAT rate in basis points (20%).
pub const DEFAULT_VAT_RATE_BPS: u32 = 2000;

/// Default store currency.
pub const DEFAULT_CURRENCY: &str = "EUR";
