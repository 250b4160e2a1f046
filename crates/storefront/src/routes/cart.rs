//! Cart route handlers.
//!
//! The visitor's session holds a [`CartId`]; the cart itself lives in the
//! [`CartRegistry`](crate::cart::CartRegistry). A handler locks the cart,
//! loads it into a [`CartStore`], applies one operation and puts the result
//! back before releasing the lock, so concurrent requests from one visitor
//! never overwrite each other.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    Json,
    extract::State,
    http::HeaderValue,
    response::{IntoResponse, Response},
};
use marketstall_core::{CurrencyCode, Price, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use crate::cart::{CartGuard, CartId, CartLine, CartState, CartStore};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;

/// Session key holding the visitor's cart ID.
pub const CART_SESSION_KEY: &str = "cart_id";

/// Response header set when an action could have changed the cart's lines.
pub const CART_UPDATED_HEADER: &str = "x-cart-updated";

// =============================================================================
// Views
// =============================================================================

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub name: String,
    pub image: String,
    pub brand: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub price: String,
    pub line_price: String,
}

impl CartItemView {
    fn new(line: &CartLine, currency: CurrencyCode) -> Self {
        let product = line.product();
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            image: product.image.clone(),
            brand: product.brand.clone(),
            quantity: line.quantity(),
            unit_price: line.unit_price(),
            line_total: line.total(),
            price: Price::new(line.unit_price(), currency).display(),
            line_price: Price::new(line.total(), currency).display(),
        }
    }
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: u64,
    pub total_price: Decimal,
    pub subtotal: String,
    pub is_open: bool,
}

impl CartView {
    #[must_use]
    pub fn new(cart: &CartState, currency: CurrencyCode) -> Self {
        Self {
            items: cart
                .lines()
                .iter()
                .map(|line| CartItemView::new(line, currency))
                .collect(),
            item_count: cart.total_items(),
            total_price: cart.total_price(),
            subtotal: Price::new(cart.total_price(), currency).display(),
            is_open: cart.is_open(),
        }
    }
}

/// Cart count badge data.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CartCount {
    pub count: u64,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// The cart ID stored in the session, if any. An unreadable ID counts as
/// none.
async fn session_cart_id(session: &Session) -> Result<Option<CartId>> {
    match session.get::<CartId>(CART_SESSION_KEY).await {
        Ok(id) => Ok(id),
        Err(tower_sessions::session::Error::SerdeJson(e)) => {
            tracing::warn!(error = %e, "Discarding unreadable cart ID from session");
            Ok(None)
        }
        Err(e) => Err(AppError::Session(e)),
    }
}

/// Lock the visitor's cart, giving the session a new cart if it has none.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn lock_cart(state: &AppState, session: &Session) -> Result<CartGuard> {
    let id = match session_cart_id(session).await? {
        Some(id) => id,
        None => {
            let id = Uuid::new_v4();
            session.insert(CART_SESSION_KEY, id).await?;
            tracing::debug!(cart_id = %id, "Assigned new cart");
            id
        }
    };
    Ok(state.carts().lock(id).await)
}

/// Lock the visitor's cart if the session has one.
///
/// Read-only handlers use this so browsing never creates a session.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn lock_existing_cart(state: &AppState, session: &Session) -> Result<Option<CartGuard>> {
    match session_cart_id(session).await? {
        Some(id) => Ok(Some(state.carts().lock(id).await)),
        None => Ok(None),
    }
}

/// Copy of the visitor's cart. A visitor without a cart sees an empty one.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn read_cart(state: &AppState, session: &Session) -> Result<CartState> {
    Ok(lock_existing_cart(state, session)
        .await?
        .map(|cart| CartState::clone(&cart))
        .unwrap_or_default())
}

/// Apply `operation` to the visitor's cart and respond with the new view.
///
/// The cart stays locked from load to write-back. A subscriber watches the
/// dispatched action and sets [`CART_UPDATED_HEADER`] when it could have
/// changed the lines.
async fn mutate<F>(state: &AppState, session: &Session, operation: F) -> Result<Response>
where
    F: FnOnce(&mut CartStore),
{
    let mut cart = lock_cart(state, session).await?;
    let mut store = CartStore::from_state(std::mem::take(&mut *cart));

    let touched = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&touched);
    store.subscribe(move |action, _| {
        if action.touches_lines() {
            flag.store(true, Ordering::Relaxed);
        }
    });

    operation(&mut store);
    *cart = store.into_state();

    let mut response = Json(CartView::new(&cart, state.config().currency)).into_response();
    if touched.load(Ordering::Relaxed) {
        response
            .headers_mut()
            .insert(CART_UPDATED_HEADER, HeaderValue::from_static("true"));
    }
    Ok(response)
}

// =============================================================================
// Request Bodies
// =============================================================================

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: String,
}

/// Update cart request body.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub product_id: String,
    pub quantity: i64,
}

/// Remove from cart request body.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub product_id: String,
}

/// Drawer visibility request body.
#[derive(Debug, Deserialize)]
pub struct SetOpenRequest {
    pub is_open: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// Current cart.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let cart = read_cart(&state, &session).await?;
    Ok(Json(CartView::new(&cart, state.config().currency)))
}

/// Add one unit of a product.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddToCartRequest>,
) -> Result<Response> {
    let id = ProductId::new(request.product_id);
    let product = state.api().get_product(&id).await?;

    if !product.in_stock {
        return Err(AppError::BadRequest(format!(
            "{} is out of stock",
            product.name
        )));
    }

    add_breadcrumb("cart", "Added item", Some(&[("product_id", id.as_str())]));
    mutate(&state, &session, |store| {
        store.add_item(product);
    })
    .await
}

/// Set a line's quantity. Zero or negative removes the line.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Response> {
    let id = ProductId::new(request.product_id);
    mutate(&state, &session, |store| {
        store.update_quantity(&id, request.quantity);
    })
    .await
}

#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<RemoveFromCartRequest>,
) -> Result<Response> {
    let id = ProductId::new(request.product_id);
    add_breadcrumb("cart", "Removed item", Some(&[("product_id", id.as_str())]));
    mutate(&state, &session, |store| {
        store.remove_item(&id);
    })
    .await
}

#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Response> {
    mutate(&state, &session, CartStore::clear_cart).await
}

/// Flip drawer visibility.
#[instrument(skip(state, session))]
pub async fn toggle(State(state): State<AppState>, session: Session) -> Result<Response> {
    mutate(&state, &session, CartStore::toggle_cart).await
}

/// Set drawer visibility.
#[instrument(skip(state, session))]
pub async fn open(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SetOpenRequest>,
) -> Result<Response> {
    mutate(&state, &session, |store| {
        store.set_cart_open(request.is_open);
    })
    .await
}

/// Cart count badge.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<Json<CartCount>> {
    let cart = read_cart(&state, &session).await?;
    Ok(Json(CartCount {
        count: cart.total_items(),
    }))
}
