//! Wire types for the backend REST API.
//!
//! The backend speaks camelCase JSON with document-store IDs (`_id`). These
//! types mirror that shape and convert into the core domain types.

use marketstall_core::{Category, CategoryId, Product, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::checkout::{DeliveryDetails, Shipping};

// =============================================================================
// Catalog
// =============================================================================

/// Response body of `GET /products`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductsResponse {
    #[serde(default)]
    pub products: Vec<WireProduct>,
}

/// Response body of `GET /categories`.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoriesResponse {
    #[serde(default)]
    pub categories: Vec<WireCategory>,
}

/// A product as the backend sends it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireProduct {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub original_price: Option<Decimal>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<WireProduct> for Product {
    fn from(wire: WireProduct) -> Self {
        Self {
            id: ProductId::from(wire.id),
            name: wire.name,
            price: wire.price,
            original_price: wire.original_price,
            image: wire.image,
            brand: wire.brand,
            category: wire.category,
            description: wire.description,
            features: wire.features,
            rating: wire.rating,
            review_count: wire.review_count,
            in_stock: wire.in_stock,
            tags: wire.tags,
        }
    }
}

/// A category as the backend sends it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCategory {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub product_count: u32,
}

impl From<WireCategory> for Category {
    fn from(wire: WireCategory) -> Self {
        Self {
            id: CategoryId::from(wire.id),
            name: wire.name,
            slug: wire.slug,
            image: wire.image,
            product_count: wire.product_count,
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Delivery fields in wire form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDeliveryDetails {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone_number: String,
}

impl From<&DeliveryDetails> for WireDeliveryDetails {
    fn from(details: &DeliveryDetails) -> Self {
        Self {
            first_name: details.first_name.trim().to_string(),
            last_name: details.last_name.trim().to_string(),
            address: details.address.trim().to_string(),
            phone_number: details.phone_number.trim().to_string(),
        }
    }
}

/// Request body of `POST /place-orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(flatten)]
    pub delivery: WireDeliveryDetails,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub sub_total: Decimal,
    pub shipping: Shipping,
    /// Tax rate in percent.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub tax: Decimal,
    /// One entry per unit ordered.
    pub product_ids: Vec<ProductId>,
}

/// Price breakdown echoed back by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePriceDetails {
    #[serde(default)]
    pub sub_total: Decimal,
    #[serde(default)]
    pub tax_amount: Decimal,
    #[serde(default)]
    pub shipping: String,
    #[serde(default)]
    pub total: Decimal,
}

/// A product line echoed back by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderedProduct {
    #[serde(flatten)]
    pub product: WireProduct,
    #[serde(default)]
    pub quantity: Option<u32>,
}

/// Response body of `POST /place-orders`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub delivery_details: WireDeliveryDetails,
    #[serde(default)]
    pub price_details: WirePriceDetails,
    #[serde(default)]
    pub products_details: Vec<OrderedProduct>,
}
