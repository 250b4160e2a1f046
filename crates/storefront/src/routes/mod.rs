//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products               - Product listing (?search=&category=&sort=)
//! GET  /products/trending      - Products rated 4.5 or higher
//! GET  /products/premium       - Products priced above 200
//! GET  /products/featured      - First four products
//! GET  /products/{id}          - Product detail
//! GET  /categories             - Category listing
//!
//! # Cart (session-backed)
//! GET  /cart                   - Cart view
//! POST /cart/add               - Add one unit (sets x-cart-updated)
//! POST /cart/update            - Set quantity (sets x-cart-updated)
//! POST /cart/remove            - Remove line (sets x-cart-updated)
//! POST /cart/clear             - Remove all lines (sets x-cart-updated)
//! POST /cart/toggle            - Flip drawer visibility
//! POST /cart/open              - Set drawer visibility
//! GET  /cart/count             - Cart count badge
//!
//! # Checkout
//! GET  /checkout/summary       - Subtotal, tax and total
//! POST /checkout               - Place order
//! ```

pub mod cart;
pub mod checkout;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/trending", get(products::trending))
        .route("/premium", get(products::premium))
        .route("/featured", get(products::featured))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/toggle", post(cart::toggle))
        .route("/open", post(cart::open))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout::place_order))
        .route("/summary", get(checkout::summary))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .route("/categories", get(products::categories))
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::cart::CART_UPDATED_HEADER;
    use crate::config::StorefrontConfig;
    use crate::state::AppState;

    /// App whose backend API is unreachable; only routes that never call it
    /// are exercised here.
    fn test_app() -> Router {
        let config = StorefrontConfig::from_lookup(|key| match key {
            "STOREFRONT_API_URL" => Some("http://127.0.0.1:9/".to_string()),
            _ => None,
        })
        .unwrap();
        crate::app(AppState::new(config))
    }

    fn request(method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    fn session_cookie(response: &Response) -> Option<String> {
        response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(str::to_string)
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(request("GET", "/health", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_empty_cart() {
        let response = test_app()
            .oneshot(request("GET", "/cart", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["item_count"], 0);
        assert_eq!(body["subtotal"], "₹0.00");
        assert_eq!(body["is_open"], false);
    }

    #[tokio::test]
    async fn test_toggle_is_remembered_without_cart_updated_header() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(request("POST", "/cart/toggle", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(CART_UPDATED_HEADER).is_none());
        let cookie = session_cookie(&response).unwrap();
        assert_eq!(json_body(response).await["is_open"], true);

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/cart/open",
                Some(&cookie),
                Some(json!({ "is_open": false })),
            ))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["is_open"], false);

        let response = app
            .oneshot(request("POST", "/cart/toggle", Some(&cookie), None))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["is_open"], true);
    }

    #[tokio::test]
    async fn test_line_actions_set_cart_updated_header() {
        let response = test_app()
            .oneshot(request(
                "POST",
                "/cart/update",
                None,
                Some(json!({ "product_id": "missing", "quantity": 3 })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(CART_UPDATED_HEADER).unwrap(), "true");
        assert_eq!(json_body(response).await["item_count"], 0);

        let response = test_app()
            .oneshot(request("POST", "/cart/clear", None, None))
            .await
            .unwrap();
        assert_eq!(response.headers().get(CART_UPDATED_HEADER).unwrap(), "true");
    }

    #[tokio::test]
    async fn test_cart_count_starts_at_zero() {
        let response = test_app()
            .oneshot(request("GET", "/cart/count", None, None))
            .await
            .unwrap();
        assert_eq!(json_body(response).await, json!({ "count": 0 }));
    }

    #[tokio::test]
    async fn test_checkout_summary_for_empty_cart() {
        let response = test_app()
            .oneshot(request("GET", "/checkout/summary", None, None))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["item_count"], 0);
        assert_eq!(body["display"]["total"], "₹0.00");
        assert_eq!(body["display"]["shipping"], "free");
    }

    #[tokio::test]
    async fn test_checkout_rejects_missing_field() {
        let response = test_app()
            .oneshot(request(
                "POST",
                "/checkout",
                None,
                Some(json!({
                    "first_name": "Asha",
                    "last_name": "  ",
                    "address": "12 MG Road",
                    "phone_number": "98450"
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"],
            "Missing required field: last_name"
        );
    }

    #[tokio::test]
    async fn test_checkout_rejects_empty_cart() {
        let response = test_app()
            .oneshot(request(
                "POST",
                "/checkout",
                None,
                Some(json!({
                    "first_name": "Asha",
                    "last_name": "Rao",
                    "address": "12 MG Road",
                    "phone_number": "98450"
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Cart is empty");
    }
}
