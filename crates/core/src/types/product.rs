//! Product and category snapshots.
//!
//! These are immutable copies of catalog data taken when the catalog was
//! fetched. The cart captures a `Product` at add time and never re-reads it,
//! so the unit price a shopper saw is the one they are charged.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::types::id::{CategoryId, ProductId};

/// Snapshot of a catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Current unit price.
    pub price: Decimal,
    /// Price before discount, if the product is on sale.
    #[serde(default)]
    pub original_price: Option<Decimal>,
    pub image: String,
    #[serde(default)]
    pub brand: String,
    /// Category *name* (not slug), as the catalog reports it.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u32,
    pub in_stock: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Product {
    /// Discount relative to `original_price`, as a whole percentage.
    ///
    /// Halves round away from zero. Returns 0 when there is no original price
    /// or it is not positive.
    #[must_use]
    pub fn discount_percentage(&self) -> i64 {
        let Some(original) = self.original_price.filter(|p| p.is_sign_positive() && !p.is_zero())
        else {
            return 0;
        };

        ((original - self.price) / original * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .unwrap_or(0)
    }
}

/// A catalog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub product_count: u32,
}
