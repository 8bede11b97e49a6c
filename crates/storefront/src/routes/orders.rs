//! Order placement route handlers.
//!
//! Three entry points share the lifecycle engine: explicit checkout into
//! the local store, direct submission to the marketplace, and the chaos
//! generator that fabricates randomized orders for soak testing.

use axum::Json;
use axum::extract::State;
use driftwood_core::ShippingAddress;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument};

use crate::error::{AppError, Result};
use crate::middleware::ShopperSession;
use crate::services::{chaos, orders};
use crate::state::AppState;

/// Local checkout request body.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub product_ids: Vec<String>,
    /// Stored verbatim; an absent address becomes an empty document.
    #[serde(default = "empty_shipping_info")]
    pub shipping_info: Value,
}

fn empty_shipping_info() -> Value {
    json!({})
}

/// Direct marketplace submission request body.
#[derive(Debug, Deserialize)]
pub struct DirectOrderRequest {
    pub product_ids: Vec<String>,
    #[serde(default)]
    pub shipping_info: ShippingAddress,
}

/// Place a local order from the request's product list.
#[instrument(skip(state, shopper, request), fields(session_id = %shopper.id))]
pub async fn place(
    State(state): State<AppState>,
    shopper: ShopperSession,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<Json<Value>> {
    let order = orders::place_order(
        state.pool(),
        &shopper.id,
        &request.product_ids,
        &request.shipping_info,
    )
    .await?;

    Ok(Json(json!({
        "status": "success",
        "order_id": order.id,
    })))
}

/// Submit an order straight to the marketplace.
#[instrument(skip(state, shopper, request), fields(session_id = %shopper.id))]
pub async fn place_direct(
    State(state): State<AppState>,
    shopper: ShopperSession,
    Json(request): Json<DirectOrderRequest>,
) -> Result<Json<Value>> {
    orders::place_marketplace_order(
        state.pool(),
        state.shipstation(),
        &shopper.id,
        &request.product_ids,
        &request.shipping_info,
    )
    .await?;

    Ok(Json(json!({"message": "Order placed successfully!"})))
}

/// Generate a randomized order against the live catalog.
///
/// Gated by the per-session cooldown. An empty catalog is not an error;
/// the endpoint acknowledges without placing anything.
#[instrument(skip(state, shopper), fields(session_id = %shopper.id))]
pub async fn place_chaos(
    State(state): State<AppState>,
    shopper: ShopperSession,
) -> Result<Json<Value>> {
    if !state.throttle().check_and_record(&shopper.id) {
        return Err(AppError::RateLimited);
    }

    let persona = state.address_book().pick();
    let catalog = state.shipstation().fetch_products().await?;
    let product_ids = chaos::pick_product_ids(&mut rand::rng(), &catalog);

    if product_ids.is_empty() {
        info!("Catalog is empty, nothing to order");
        return Ok(Json(json!({"message": "Order placed successfully!"})));
    }

    let shipping_info = serde_json::to_value(&persona.address)
        .map_err(|e| AppError::Internal(format!("Failed to serialize persona address: {e}")))?;

    let order =
        orders::place_order(state.pool(), &shopper.id, &product_ids, &shipping_info).await?;

    info!(
        order_id = %order.id,
        persona = %persona.name,
        product_count = product_ids.len(),
        "Placed chaos order"
    );

    Ok(Json(json!({"message": "Order placed successfully!"})))
}
