//! Backend API client implementation.
//!
//! Caches the product and category lists using `moka`.

use std::sync::Arc;

use marketstall_core::{Category, Product, ProductId};
use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::ApiError;
use super::cache::{CacheKey, CacheValue};
use super::types::{CategoriesResponse, PlaceOrderRequest, PlaceOrderResponse, ProductsResponse};
use crate::catalog;
use crate::config::ApiConfig;

/// Characters of a response body kept in logs.
const LOG_BODY_LIMIT: usize = 500;

/// Characters of a response body kept in error messages.
const ERROR_BODY_LIMIT: usize = 200;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the products, categories and orders API.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(config.cache_ttl)
            .build();

        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                cache,
            }),
        }
    }

    /// Base URL all endpoints are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Execute a GET request and parse the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let response = self.inner.client.get(url).send().await?;
        Self::read_json(response).await
    }

    /// Execute a POST request with a JSON body and parse the JSON response.
    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let response = self.inner.client.post(url).json(body).send().await?;
        Self::read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %truncate(&response_text, LOG_BODY_LIMIT),
                "Backend API returned non-success status"
            );
            return Err(ApiError::Status {
                status,
                body: truncate(&response_text, ERROR_BODY_LIMIT),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&response_text, LOG_BODY_LIMIT),
                "Failed to parse backend API response"
            );
            ApiError::Parse(e)
        })
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Get every product in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Arc<[Product]>, ApiError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let response: ProductsResponse = self.get_json("products").await?;
        let products: Arc<[Product]> = response.products.into_iter().map(Product::from).collect();
        debug!(count = products.len(), "Fetched products");

        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(Arc::clone(&products)))
            .await;

        Ok(products)
    }

    /// Get a single product by ID from the catalog.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if no product has this ID, or an error if
    /// the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let products = self.get_products().await?;
        catalog::find_product(&products, id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Product not found: {id}")))
    }

    /// Get every category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Arc<[Category]>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let response: CategoriesResponse = self.get_json("categories").await?;
        let categories: Arc<[Category]> = response
            .categories
            .into_iter()
            .map(Category::from)
            .collect();

        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(Arc::clone(&categories)),
            )
            .await;

        Ok(categories)
    }

    /// Drop cached catalog data so the next read goes to the backend.
    pub async fn invalidate_catalog(&self) {
        self.inner.cache.invalidate(&CacheKey::Products).await;
        self.inner.cache.invalidate(&CacheKey::Categories).await;
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Submit an order. Not idempotent; the caller decides whether to retry.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the backend answers with
    /// `success: false`, or an error if the API request fails.
    #[instrument(skip(self, request), fields(units = request.product_ids.len()))]
    pub async fn place_order(
        &self,
        request: &PlaceOrderRequest,
    ) -> Result<PlaceOrderResponse, ApiError> {
        let response: PlaceOrderResponse = self.post_json("place-orders", request).await?;

        if !response.success {
            tracing::warn!(message = %response.message, "Backend rejected order");
            return Err(ApiError::Rejected(response.message));
        }

        debug!("Order accepted");
        Ok(response)
    }
}

fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("₹₹₹₹", 2), "₹₹");
        assert_eq!(truncate("short", 100), "short");
    }

    #[test]
    fn test_endpoint_resolves_against_base_path() {
        let config = ApiConfig {
            base_url: Url::parse("http://localhost:5000/api/").unwrap(),
            cache_ttl: std::time::Duration::from_secs(1),
        };
        let client = ApiClient::new(&config);

        let url = client.endpoint("place-orders").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/place-orders");
    }

    #[test]
    fn test_not_found_classification() {
        assert!(ApiError::NotFound("x".to_string()).is_not_found());
        assert!(
            !ApiError::Status {
                status: reqwest::StatusCode::NOT_FOUND,
                body: String::new(),
            }
            .is_not_found()
        );
        assert!(!ApiError::Rejected("no".to_string()).is_not_found());
    }
}
