//! Integration tests for Marketstall.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p marketstall-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_store` - Cart behavior through the public library API
//! - `storefront_routes` - Full HTTP flows against a running storefront
//!
//! [`TestContext`] starts an in-process mock of the backend REST API and a
//! storefront pointed at it, each on an ephemeral port, so no external
//! services are needed.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use marketstall_storefront::config::StorefrontConfig;
use marketstall_storefront::state::AppState;
use serde_json::{Value, json};
use tokio::net::TcpListener;

// =============================================================================
// Mock Backend
// =============================================================================

/// State of the mock backend API.
#[derive(Default)]
pub struct MockBackend {
    orders: Mutex<Vec<Value>>,
    product_requests: AtomicUsize,
    fail_orders: AtomicBool,
    reject_orders: AtomicBool,
    slow_orders: AtomicBool,
}

impl MockBackend {
    /// Order bodies received so far.
    #[must_use]
    pub fn orders(&self) -> Vec<Value> {
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of `GET /products` calls served.
    #[must_use]
    pub fn product_requests(&self) -> usize {
        self.product_requests.load(Ordering::SeqCst)
    }

    /// Answer order submissions with HTTP 500.
    pub fn fail_orders(&self, fail: bool) {
        self.fail_orders.store(fail, Ordering::SeqCst);
    }

    /// Hold each order submission for a moment before answering.
    pub fn slow_orders(&self, slow: bool) {
        self.slow_orders.store(slow, Ordering::SeqCst);
    }

    /// Answer order submissions with `success: false`.
    pub fn reject_orders(&self, reject: bool) {
        self.reject_orders.store(reject, Ordering::SeqCst);
    }
}

/// Products served by the mock backend, in the backend's wire shape.
#[must_use]
pub fn catalog_fixture() -> Value {
    json!({
        "products": [
            {
                "_id": "p-headphones",
                "name": "Wireless Headphones",
                "image": "https://cdn.example.com/headphones.jpg",
                "description": "Over-ear, noise cancelling",
                "originalPrice": 399,
                "price": 299,
                "category": "Audio",
                "brand": "Acme",
                "features": ["ANC", "40h battery"],
                "rating": 4.8,
                "reviewCount": 310,
                "inStock": true,
                "tags": ["bestseller"],
                "createdAt": "2024-05-01T10:00:00.000Z",
                "updatedAt": "2024-05-01T10:00:00.000Z",
                "__v": 0
            },
            {
                "_id": "p-speaker",
                "name": "Bluetooth Speaker",
                "image": "https://cdn.example.com/speaker.jpg",
                "price": 89.5,
                "category": "Audio",
                "brand": "Acme",
                "rating": 4.1,
                "reviewCount": 52,
                "inStock": true
            },
            {
                "_id": "p-watch",
                "name": "Smart Watch",
                "image": "https://cdn.example.com/watch.jpg",
                "price": 199,
                "category": "Wearables",
                "brand": "Tick",
                "rating": 4.6,
                "reviewCount": 97,
                "inStock": true
            },
            {
                "_id": "p-band",
                "name": "Fitness Band",
                "image": "https://cdn.example.com/band.jpg",
                "price": 49,
                "category": "Wearables",
                "brand": "Tick",
                "rating": 3.9,
                "reviewCount": 12,
                "inStock": false
            },
            {
                "_id": "p-lamp",
                "name": "Desk Lamp",
                "image": "https://cdn.example.com/lamp.jpg",
                "price": 25,
                "category": "Home",
                "brand": "Glow",
                "rating": 4.9,
                "reviewCount": 8,
                "inStock": true
            }
        ]
    })
}

/// Categories served by the mock backend.
#[must_use]
pub fn categories_fixture() -> Value {
    json!({
        "categories": [
            { "_id": "c-audio", "name": "Audio", "slug": "audio", "image": "", "productCount": 2 },
            { "_id": "c-wear", "name": "Wearables", "slug": "wearables", "image": "", "productCount": 2 },
            { "_id": "c-home", "name": "Home", "slug": "home", "image": "", "productCount": 1 }
        ]
    })
}

async fn mock_products(State(backend): State<Arc<MockBackend>>) -> Json<Value> {
    backend.product_requests.fetch_add(1, Ordering::SeqCst);
    Json(catalog_fixture())
}

async fn mock_categories() -> Json<Value> {
    Json(categories_fixture())
}

async fn mock_place_order(
    State(backend): State<Arc<MockBackend>>,
    Json(order): Json<Value>,
) -> Response {
    backend
        .orders
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(order.clone());

    if backend.slow_orders.load(Ordering::SeqCst) {
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    }

    if backend.fail_orders.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable").into_response();
    }

    if backend.reject_orders.load(Ordering::SeqCst) {
        return Json(json!({ "success": false, "message": "Order could not be placed" }))
            .into_response();
    }

    Json(json!({
        "success": true,
        "message": "Order placed successfully",
        "deliveryDetails": {
            "firstName": order["firstName"],
            "lastName": order["lastName"],
            "address": order["address"],
            "phoneNumber": order["phoneNumber"]
        },
        "priceDetails": {
            "subTotal": order["subTotal"],
            "taxAmount": 0,
            "shipping": order["shipping"],
            "total": order["subTotal"]
        },
        "productsDetails": []
    }))
    .into_response()
}

fn mock_router(backend: Arc<MockBackend>) -> Router {
    Router::new()
        .route("/api/products", get(mock_products))
        .route("/api/categories", get(mock_categories))
        .route("/api/place-orders", post(mock_place_order))
        .with_state(backend)
}

#[allow(clippy::print_stderr)]
async fn spawn(name: &'static str, router: Router) -> std::io::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            eprintln!("{name} server on {addr} stopped: {e}");
        }
    });
    Ok(addr)
}

// =============================================================================
// TestContext
// =============================================================================

/// A running storefront wired to a mock backend.
pub struct TestContext {
    /// Client with a cookie store, so it keeps one session (and one cart).
    pub client: reqwest::Client,
    pub storefront_url: String,
    pub backend: Arc<MockBackend>,
}

impl TestContext {
    /// Start the mock backend and a storefront pointed at it.
    ///
    /// # Errors
    ///
    /// Returns an error if a listener cannot be bound or the configuration
    /// or client cannot be built.
    pub async fn start() -> Result<Self, Box<dyn std::error::Error>> {
        let backend = Arc::new(MockBackend::default());
        let backend_addr = spawn("mock backend", mock_router(Arc::clone(&backend))).await?;

        let api_url = format!("http://{backend_addr}/api");
        let config = StorefrontConfig::from_lookup(|key| match key {
            "STOREFRONT_API_URL" => Some(api_url.clone()),
            _ => None,
        })?;
        let storefront_addr = spawn(
            "storefront",
            marketstall_storefront::app(AppState::new(config)),
        ).await?;

        let client = reqwest::Client::builder().cookie_store(true).build()?;

        Ok(Self {
            client,
            storefront_url: format!("http://{storefront_addr}"),
            backend,
        })
    }

    /// Absolute storefront URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }

    /// GET `path` and parse the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not JSON.
    pub async fn get_json(&self, path: &str) -> Result<(StatusCode, Value), reqwest::Error> {
        let response = self.client.get(self.url(path)).send().await?;
        let status = response.status();
        Ok((status, response.json().await?))
    }

    /// POST `body` to `path` and return the raw response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<reqwest::Response, reqwest::Error> {
        self.client.post(self.url(path)).json(body).send().await
    }
}
