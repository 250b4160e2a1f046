//! Product and category route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use marketstall_core::{Category, CurrencyCode, Price, Product, ProductId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::catalog::{self, CategoryFilter, ProductQuery, SortKey};
use crate::error::Result;
use crate::state::AppState;

/// Product display data with formatted prices.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub price_display: String,
    pub original_price_display: Option<String>,
    pub discount_percentage: i64,
}

impl ProductView {
    #[must_use]
    pub fn new(product: Product, currency: CurrencyCode) -> Self {
        Self {
            price_display: Price::new(product.price, currency).display(),
            original_price_display: product
                .original_price
                .map(|amount| Price::new(amount, currency).display()),
            discount_percentage: product.discount_percentage(),
            product,
        }
    }
}

fn views(products: Vec<Product>, currency: CurrencyCode) -> Vec<ProductView> {
    products
        .into_iter()
        .map(|product| ProductView::new(product, currency))
        .collect()
}

/// Product listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
}

impl From<ListingQuery> for ProductQuery {
    fn from(query: ListingQuery) -> Self {
        Self {
            search: query.search,
            category: query
                .category
                .as_deref()
                .map(CategoryFilter::parse)
                .unwrap_or_default(),
            sort: query
                .sort
                .as_deref()
                .map(SortKey::parse_or_default)
                .unwrap_or_default(),
        }
    }
}

/// Product listing response.
#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub products: Vec<ProductView>,
    pub count: usize,
    pub total: usize,
    pub sort: SortKey,
}

/// Searchable, filterable product listing.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<ListingResponse>> {
    let query = ProductQuery::from(query);
    let (products, categories) =
        tokio::try_join!(state.api().get_products(), state.api().get_categories())?;

    let listing = catalog::Catalog::query(&products, &categories, &query);
    let products = views(listing.products, state.config().currency);

    Ok(Json(ListingResponse {
        count: products.len(),
        products,
        total: listing.total,
        sort: query.sort,
    }))
}

/// Highly rated products.
#[instrument(skip(state))]
pub async fn trending(State(state): State<AppState>) -> Result<Json<Vec<ProductView>>> {
    let products = state.api().get_products().await?;
    Ok(Json(views(
        catalog::trending(&products),
        state.config().currency,
    )))
}

/// Products above the premium price threshold.
#[instrument(skip(state))]
pub async fn premium(State(state): State<AppState>) -> Result<Json<Vec<ProductView>>> {
    let products = state.api().get_products().await?;
    Ok(Json(views(catalog::premium(&products), state.config().currency)))
}

#[instrument(skip(state))]
pub async fn featured(State(state): State<AppState>) -> Result<Json<Vec<ProductView>>> {
    let products = state.api().get_products().await?;
    Ok(Json(views(
        catalog::featured(&products),
        state.config().currency,
    )))
}

/// Single product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductView>> {
    let id = ProductId::new(id);
    let product = state.api().get_product(&id).await?;

    Ok(Json(ProductView::new(product, state.config().currency)))
}

/// Category list response.
#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<CategoriesResponse>> {
    let categories = state.api().get_categories().await?;
    Ok(Json(CategoriesResponse {
        categories: categories.to_vec(),
    }))
}
