//! Checkout route handlers.

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use marketstall_core::ProductId;
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::CartStore;
use crate::checkout::{
    self, CheckoutError, DeliveryDetails, OrderConfirmation, PriceSummary, PriceSummaryView,
};
use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequestId;
use crate::routes::cart::{lock_existing_cart, read_cart};
use crate::state::AppState;

/// Price summary for the current cart.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub item_count: u64,
    pub product_ids: Vec<ProductId>,
    pub summary: PriceSummary,
    pub display: PriceSummaryView,
}

/// Subtotal, tax and total for the visitor's cart.
#[instrument(skip(state, session))]
pub async fn summary(State(state): State<AppState>, session: Session) -> Result<Json<SummaryResponse>> {
    let cart = read_cart(&state, &session).await?;
    let snapshot = cart.snapshot();
    let summary = PriceSummary::from_snapshot(&snapshot, state.config().tax_rate_percent);

    Ok(Json(SummaryResponse {
        item_count: snapshot.total_items,
        product_ids: snapshot.lines.iter().map(|line| line.product_id.clone()).collect(),
        display: summary.view(state.config().currency),
        summary,
    }))
}

/// Submit the visitor's cart as an order.
///
/// The cart stays locked until the order has been answered, so cart changes
/// and repeated submissions made meanwhile wait for the outcome. The cart is
/// cleared only once the backend accepts the order; on any failure it is
/// left as it was.
#[instrument(skip(state, session, request_id, details))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    request_id: Option<Extension<RequestId>>,
    Json(details): Json<DeliveryDetails>,
) -> Result<(StatusCode, Json<OrderConfirmation>)> {
    let Some(mut cart) = lock_existing_cart(&state, &session).await? else {
        details.validate()?;
        return Err(CheckoutError::EmptyCart.into());
    };
    let snapshot = cart.snapshot();
    let summary = PriceSummary::from_snapshot(&snapshot, state.config().tax_rate_percent);
    let request = checkout::order_request(&details, &snapshot, &summary)?;

    add_breadcrumb("checkout", "Submitting order", None);
    let response = state.api().place_order(&request).await?;

    let confirmation = OrderConfirmation::new(
        &cart,
        details,
        summary,
        response.message,
        state.config().currency,
    );

    let mut store = CartStore::from_state(std::mem::take(&mut *cart));
    store.clear_cart();
    *cart = store.into_state();
    drop(cart);
    state.api().invalidate_catalog().await;

    tracing::info!(
        reference = %confirmation.reference,
        request_id = request_id.as_ref().map_or("", |Extension(id)| id.as_str()),
        units = request.product_ids.len(),
        total = %confirmation.summary.total,
        "Order placed"
    );

    Ok((StatusCode::CREATED, Json(confirmation)))
}
