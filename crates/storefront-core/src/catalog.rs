//! # Product Catalog Seam
//!
//! The catalog lives in the relational store behind the REST API. Pricing
//! only needs a point lookup by product id, which is what
//! [`ProductCatalog`] exposes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::money::{Currency, Money};

/// What the catalog knows about a product at lookup time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub id: String,

    pub name: String,

    #[serde(rename = "unitPriceMinorUnits")]
    pub unit_price: Money,

    pub currency: Currency,

    /// Units on hand. `None` means stock is not tracked.
    pub stock: Option<i64>,

    /// Inactive products stay in the catalog but cannot be added to carts.
    pub active: bool,
}

impl CatalogProduct {
    /// Checks whether `quantity` units can be sold.
    pub fn can_sell(&self, quantity: i64) -> bool {
        match self.stock {
            None => true,
            Some(stock) => stock >= quantity,
        }
    }
}

/// Point lookup into the product catalog.
pub trait ProductCatalog {
    fn lookup(&self, product_id: &str) -> Option<CatalogProduct>;
}

/// Catalog held in a map, for tests and the command-line tool.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: HashMap<String, CatalogProduct>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, product: CatalogProduct) {
        self.products.insert(product.id.clone(), product);
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl FromIterator<CatalogProduct> for InMemoryCatalog {
    fn from_iter<I: IntoIterator<Item = CatalogProduct>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for product in iter {
            catalog.insert(product);
        }
        catalog
    }
}

impl ProductCatalog for InMemoryCatalog {
    fn lookup(&self, product_id: &str) -> Option<CatalogProduct> {
        self.products.get(product_id).cloned()
    }
}
