//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health               - Liveness check
//! GET  /health/ready         - Readiness check (database round trip)
//!
//! # Cart
//! GET  /cart/items           - Current cart, joined against the catalog
//! POST /cart/items           - Add one unit of a product
//!
//! # Orders
//! POST /orders               - Place a local order from explicit products
//! POST /orders/direct        - Submit an order straight to the marketplace
//! POST /orders/chaos         - Generate a randomized order
//!
//! # Marketplace integration
//! GET  /shipstation_orders   - Custom-store XML export (action=export)
//! POST /shipstation_orders   - Shipment notification callback
//! POST /marketplace/sweep    - Mark every open marketplace order as shipped
//! POST /marketplace/config   - Rotate marketplace credentials
//! ```

pub mod cart;
pub mod marketplace;
pub mod orders;
pub mod shipstation;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create all routes for the storefront.
#[must_use]
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/cart/items", get(cart::list_items).post(cart::add_item))
        .route("/orders", post(orders::place))
        .route("/orders/direct", post(orders::place_direct))
        .route("/orders/chaos", post(orders::place_chaos))
        .route(
            "/shipstation_orders",
            get(shipstation::export).post(shipstation::notify),
        )
        .route("/marketplace/sweep", post(marketplace::sweep))
        .route("/marketplace/config", post(marketplace::save_config))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
