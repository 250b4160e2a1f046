//! REST client for the catalog and order backend.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP via `reqwest`
//! - The backend is source of truth for products and categories - NO local
//!   sync, direct API calls
//! - In-memory caching via `moka` for the product and category lists
//! - Order submission is never cached and never retried
//!
//! # Example
//!
//! ```rust,ignore
//! use marketstall_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api);
//!
//! let products = client.get_products().await?;
//! let categories = client.get_categories().await?;
//! let response = client.place_order(&request).await?;
//! ```

mod cache;
mod client;
pub mod types;

pub use client::ApiClient;

use thiserror::Error;

/// Errors that can occur when talking to the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Endpoint could not be resolved against the base URL.
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend refused the order.
    #[error("Order rejected: {0}")]
    Rejected(String),
}

impl ApiError {
    /// Whether the error means the requested resource does not exist.
    ///
    /// Only a lookup that found no match counts. A 404 status from the
    /// backend means an endpoint is missing, which is a backend failure.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
