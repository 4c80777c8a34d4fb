//! # Cart
//!
//! The cart a shopper builds before checkout.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Shopper Action           Operation                 Cart Change         │
//! │  ──────────────           ─────────                 ───────────         │
//! │                                                                         │
//! │  "Add to basket" ───────► add_product() ──────────► items.push(item)   │
//! │                                                                         │
//! │  Change quantity ───────► update_quantity() ──────► items[i].qty = n   │
//! │                           (_from_catalog checks stock)                  │
//! │                                                                         │
//! │  Remove ────────────────► remove_item() ──────────► items.remove(i)    │
//! │                                                                         │
//! │  Enter promo code ──────► apply_promo_code() ─────► code + discount    │
//! │                                                                         │
//! │  View cart ─────────────► pricing::price_cart() ──► (read only)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage is somebody else's job: the cart is keyed by a guest token or
//! user id in the external cart store and handed to this crate by value.

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::catalog::{CatalogProduct, ProductCatalog};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{Currency, Money};
use crate::pricing;
use crate::promo::PromoValidator;
use crate::types::{LineItem, PricingConfig, PromoResult};
use crate::validation::validate_cart_size;

/// A shopping cart.
///
/// ## Invariants
/// - Items are unique by `product_id` (adding the same product increases
///   its quantity)
/// - Every item has quantity ≥ 1 (setting 0 removes the item)
/// - All items share one currency
/// - At most one promo code; applying a code replaces the previous one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Items in insertion order.
    pub items: Vec<LineItem>,

    /// Normalised code entered by the shopper.
    #[serde(default)]
    pub applied_promo_code: Option<String>,

    /// Discount quoted when the code was applied.
    #[serde(default, rename = "discountMinorUnits")]
    pub discount: Money,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currency of the items already in the cart.
    pub fn currency(&self) -> Option<&Currency> {
        self.items.first().map(|i| &i.currency)
    }

    /// Adds a product or increases its quantity if already present.
    ///
    /// The unit price is frozen at the first add; later adds of the same
    /// product keep the original price.
    ///
    /// ## Errors
    /// - `ProductUnavailable` for inactive products
    /// - `CurrencyMismatch` if the product's currency differs from the cart's
    ///   (or, for an empty cart, from the store currency)
    /// - `QuantityTooLarge` / `CartTooLarge` when store limits are exceeded
    /// - `InsufficientStock` when tracked stock cannot cover the new quantity
    pub fn add_product(
        &mut self,
        product: &CatalogProduct,
        quantity: i64,
        config: &PricingConfig,
    ) -> CoreResult<()> {
        if !product.active {
            return Err(CoreError::ProductUnavailable(product.id.clone()));
        }

        if quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        let expected = self.currency().unwrap_or(&config.currency);
        if &product.currency != expected {
            return Err(CoreError::CurrencyMismatch {
                product_id: product.id.clone(),
                expected: expected.clone(),
                found: product.currency.clone(),
            });
        }

        let existing = self.items.iter().position(|i| i.product_id == product.id);
        let new_qty = match existing {
            Some(index) => self.items[index].quantity.saturating_add(quantity),
            None => quantity,
        };

        if new_qty > config.max_item_quantity {
            return Err(CoreError::QuantityTooLarge {
                requested: new_qty,
                max: config.max_item_quantity,
            });
        }

        if !product.can_sell(new_qty) {
            return Err(CoreError::InsufficientStock {
                product_id: product.id.clone(),
                available: product.stock.unwrap_or(0),
                requested: new_qty,
            });
        }

        match existing {
            Some(index) => self.items[index].quantity = new_qty,
            None => {
                validate_cart_size(self.items.len(), config.max_cart_items).map_err(|_| {
                    CoreError::CartTooLarge {
                        max: config.max_cart_items,
                    }
                })?;
                self.items.push(LineItem::new(
                    product.id.clone(),
                    quantity,
                    product.unit_price,
                    product.currency.clone(),
                ));
            }
        }

        debug!(product_id = %product.id, quantity = new_qty, "Cart item added");
        Ok(())
    }

    /// Looks the product up in `catalog` and adds it.
    pub fn add_from_catalog<C>(
        &mut self,
        catalog: &C,
        product_id: &str,
        quantity: i64,
        config: &PricingConfig,
    ) -> CoreResult<()>
    where
        C: ProductCatalog + ?Sized,
    {
        let product = catalog
            .lookup(product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;
        self.add_product(&product, quantity, config)
    }

    /// Re-reads the product from `catalog` and sets the quantity, checking
    /// tracked stock like [`Cart::add_product`] does.
    pub fn update_quantity_from_catalog<C>(
        &mut self,
        catalog: &C,
        product_id: &str,
        quantity: i64,
        config: &PricingConfig,
    ) -> CoreResult<()>
    where
        C: ProductCatalog + ?Sized,
    {
        if quantity > 0 {
            let product = catalog
                .lookup(product_id)
                .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;
            if !product.active {
                return Err(CoreError::ProductUnavailable(product.id));
            }
            if !product.can_sell(quantity) {
                return Err(CoreError::InsufficientStock {
                    product_id: product.id,
                    available: product.stock.unwrap_or(0),
                    requested: quantity,
                });
            }
        }
        self.update_quantity(product_id, quantity, config)
    }

    /// Sets the quantity of an item. A quantity of 0 removes it.
    ///
    /// Only store limits are checked here; the cart holds no stock levels.
    /// Use [`Cart::update_quantity_from_catalog`] when stock matters.
    pub fn update_quantity(
        &mut self,
        product_id: &str,
        quantity: i64,
        config: &PricingConfig,
    ) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(product_id);
        }

        if quantity < 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        if quantity > config.max_item_quantity {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: config.max_item_quantity,
            });
        }

        let item = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| CoreError::ItemNotInCart(product_id.to_string()))?;
        item.quantity = quantity;
        Ok(())
    }

    /// Removes an item by product id.
    pub fn remove_item(&mut self, product_id: &str) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.product_id != product_id);

        if self.items.len() == initial_len {
            Err(CoreError::ItemNotInCart(product_id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Validates `code` against the current items and stores it.
    ///
    /// Any previously applied code is replaced, so applying the same code
    /// twice leaves the cart exactly as applying it once. On rejection the
    /// cart is left untouched.
    pub fn apply_promo_code<V>(
        &mut self,
        code: &str,
        config: &PricingConfig,
        validator: &V,
    ) -> CoreResult<PromoResult>
    where
        V: PromoValidator + ?Sized,
    {
        let subtotal = pricing::compute_subtotal(&self.items)?;
        let currency = self.currency().unwrap_or(&config.currency).clone();
        let result = pricing::apply_promo(subtotal, code, &currency, validator)?;

        self.applied_promo_code = Some(code.trim().to_uppercase());
        self.discount = result.discount;
        Ok(result)
    }

    /// Drops the promo code and its quoted discount.
    pub fn remove_promo_code(&mut self) {
        self.applied_promo_code = None;
        self.discount = Money::zero();
    }

    /// Empties the cart, including any promo code.
    pub fn clear(&mut self) {
        self.items.clear();
        self.remove_promo_code();
    }

    /// Number of distinct items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::pricing::price_cart;
    use crate::promo::{InMemoryPromoValidator, PromoKind, PromoRule};

    fn eur() -> Currency {
        Currency::parse("EUR").unwrap()
    }

    fn product(id: &str, price: i64, stock: Option<i64>) -> CatalogProduct {
        CatalogProduct {
            id: id.to_string(),
            name: format!("Product {}", id),
            unit_price: Money::from_minor_units(price),
            currency: eur(),
            stock,
            active: true,
        }
    }

    fn welcome_validator() -> InMemoryPromoValidator {
        InMemoryPromoValidator::from_rules(vec![PromoRule {
            code: "WELCOME".to_string(),
            kind: PromoKind::FixedAmount {
                amount: Money::from_minor_units(500),
            },
            minimum_subtotal: Money::zero(),
            valid_from: None,
            valid_until: None,
            currency: None,
        }])
    }

    #[test]
    fn test_cart_add_item() {
        let mut cart = Cart::new();
        let config = PricingConfig::default();

        cart.add_product(&product("1", 999, None), 2, &config).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.items[0].unit_price.minor_units(), 999);
    }

    #[test]
    fn test_cart_add_same_product_increases_quantity() {
        let mut cart = Cart::new();
        let config = PricingConfig::default();
        let p = product("1", 999, None);

        cart.add_product(&p, 2, &config).unwrap();
        cart.add_product(&p, 3, &config).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_cart_freezes_price_on_first_add() {
        let mut cart = Cart::new();
        let config = PricingConfig::default();

        cart.add_product(&product("1", 999, None), 1, &config).unwrap();
        cart.add_product(&product("1", 1299, None), 1, &config).unwrap();

        assert_eq!(cart.items[0].unit_price.minor_units(), 999);
        assert_eq!(cart.items[0].quantity, 2);
    }

    #[test]
    fn test_cart_enforces_limits() {
        let mut cart = Cart::new();
        let config = PricingConfig {
            max_cart_items: 1,
            max_item_quantity: 3,
            ..PricingConfig::default()
        };

        cart.add_product(&product("1", 100, None), 3, &config).unwrap();
        assert!(matches!(
            cart.add_product(&product("1", 100, None), 1, &config),
            Err(CoreError::QuantityTooLarge { requested: 4, max: 3 })
        ));
        assert!(matches!(
            cart.add_product(&product("2", 100, None), 1, &config),
            Err(CoreError::CartTooLarge { max: 1 })
        ));
        assert!(matches!(
            cart.add_product(&product("1", 100, None), 0, &config),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_cart_checks_stock_and_availability() {
        let mut cart = Cart::new();
        let config = PricingConfig::default();

        cart.add_product(&product("1", 100, Some(3)), 2, &config).unwrap();
        match cart.add_product(&product("1", 100, Some(3)), 2, &config) {
            Err(CoreError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                assert_eq!(available, 3);
                assert_eq!(requested, 4);
            }
            other => panic!("expected InsufficientStock, got {:?}", other),
        }

        let mut inactive = product("2", 100, None);
        inactive.active = false;
        assert!(matches!(
            cart.add_product(&inactive, 1, &config),
            Err(CoreError::ProductUnavailable(_))
        ));
    }

    #[test]
    fn test_cart_rejects_other_currency() {
        let mut cart = Cart::new();
        let config = PricingConfig::default();
        let mut dollars = product("1", 100, None);
        dollars.currency = Currency::parse("USD").unwrap();

        assert!(matches!(
            cart.add_product(&dollars, 1, &config),
            Err(CoreError::CurrencyMismatch { .. })
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_from_catalog() {
        let catalog: InMemoryCatalog = vec![product("mug", 1250, Some(10))].into_iter().collect();
        let mut cart = Cart::new();
        let config = PricingConfig::default();

        cart.add_from_catalog(&catalog, "mug", 2, &config).unwrap();
        assert_eq!(cart.total_quantity(), 2);

        assert!(matches!(
            cart.add_from_catalog(&catalog, "bowl", 1, &config),
            Err(CoreError::ProductNotFound(_))
        ));
    }

    #[test]
    fn test_update_and_remove() {
        let mut cart = Cart::new();
        let config = PricingConfig::default();
        cart.add_product(&product("1", 100, None), 1, &config).unwrap();
        cart.add_product(&product("2", 100, None), 1, &config).unwrap();

        cart.update_quantity("1", 4, &config).unwrap();
        assert_eq!(cart.total_quantity(), 5);

        cart.update_quantity("1", 0, &config).unwrap();
        assert_eq!(cart.item_count(), 1);

        assert!(matches!(
            cart.update_quantity("missing", 1, &config),
            Err(CoreError::ItemNotInCart(_))
        ));
        assert!(matches!(
            cart.update_quantity("2", 1000, &config),
            Err(CoreError::QuantityTooLarge { .. })
        ));
        assert!(cart.remove_item("missing").is_err());
        cart.remove_item("2").unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_from_catalog_checks_stock() {
        let mut sold_out = product("bowl", 800, Some(0));
        sold_out.active = false;
        let catalog: InMemoryCatalog = vec![product("mug", 1250, Some(3)), sold_out]
            .into_iter()
            .collect();
        let mut cart = Cart::new();
        let config = PricingConfig::default();
        cart.add_from_catalog(&catalog, "mug", 1, &config).unwrap();

        cart.update_quantity_from_catalog(&catalog, "mug", 3, &config).unwrap();
        assert_eq!(cart.total_quantity(), 3);

        match cart.update_quantity_from_catalog(&catalog, "mug", 4, &config) {
            Err(CoreError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                assert_eq!(available, 3);
                assert_eq!(requested, 4);
            }
            other => panic!("expected InsufficientStock, got {:?}", other),
        }
        assert_eq!(cart.total_quantity(), 3);

        assert!(matches!(
            cart.update_quantity_from_catalog(&catalog, "bowl", 1, &config),
            Err(CoreError::ProductUnavailable(_))
        ));
        assert!(matches!(
            cart.update_quantity_from_catalog(&catalog, "plate", 1, &config),
            Err(CoreError::ProductNotFound(_))
        ));

        cart.update_quantity_from_catalog(&catalog, "mug", 0, &config).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_same_promo_code_twice_applies_once() {
        let mut cart = Cart::new();
        let config = PricingConfig::default();
        let validator = welcome_validator();
        cart.add_product(&product("1", 1000, None), 1, &config).unwrap();

        cart.apply_promo_code("welcome", &config, &validator).unwrap();
        let once = price_cart(&cart, &config, &validator).unwrap();

        cart.apply_promo_code("WELCOME ", &config, &validator).unwrap();
        let twice = price_cart(&cart, &config, &validator).unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice.discount.minor_units(), 500);
        assert_eq!(twice.total.minor_units(), 1000 + 200 - 500);
        assert_eq!(cart.applied_promo_code.as_deref(), Some("WELCOME"));
    }

    #[test]
    fn test_rejected_promo_leaves_cart_untouched() {
        let mut cart = Cart::new();
        let config = PricingConfig::default();
        let validator = welcome_validator();
        cart.add_product(&product("1", 1000, None), 1, &config).unwrap();
        cart.apply_promo_code("WELCOME", &config, &validator).unwrap();

        assert!(matches!(
            cart.apply_promo_code("BOGUS", &config, &validator),
            Err(CoreError::InvalidPromoCode { .. })
        ));
        assert_eq!(cart.applied_promo_code.as_deref(), Some("WELCOME"));
        assert_eq!(cart.discount.minor_units(), 500);
    }

    #[test]
    fn test_promo_discount_is_requoted_when_cart_shrinks() {
        let mut cart = Cart::new();
        let config = PricingConfig::default();
        let validator = welcome_validator();
        cart.add_product(&product("1", 1000, None), 1, &config).unwrap();
        cart.add_product(&product("2", 200, None), 1, &config).unwrap();
        cart.apply_promo_code("WELCOME", &config, &validator).unwrap();

        cart.remove_item("1").unwrap();
        let summary = price_cart(&cart, &config, &validator).unwrap();

        // 500 off a 200 subtotal is capped at 200
        assert_eq!(summary.discount.minor_units(), 200);
        assert_eq!(summary.total.minor_units(), 40);
    }

    #[test]
    fn test_clear_drops_promo() {
        let mut cart = Cart::new();
        let config = PricingConfig::default();
        cart.add_product(&product("1", 1000, None), 1, &config).unwrap();
        cart.apply_promo_code("WELCOME", &config, &welcome_validator()).unwrap();

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.applied_promo_code, None);
        assert_eq!(cart.discount, Money::zero());
    }

    #[test]
    fn test_cart_json_shape() {
        let json = r#"{
            "items": [{"productId": "mug", "quantity": 2, "unitPriceMinorUnits": 1250, "currency": "EUR"}],
            "appliedPromoCode": "WELCOME"
        }"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.discount, Money::zero());
        assert_eq!(cart.applied_promo_code.as_deref(), Some("WELCOME"));
    }
}
