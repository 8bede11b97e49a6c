//! Cart route handlers.
//!
//! The cart stores one row per unit; the list endpoint collapses those
//! rows into display lines and joins them against the live marketplace
//! catalog for product names.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use driftwood_core::{CatalogProduct, CatalogProductId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::CartRepository;
use crate::error::Result;
use crate::middleware::ShopperSession;
use crate::models::CartItem;
use crate::state::AppState;

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
}

/// One cart line, aggregated per product.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub product_id: String,
    /// Catalog name, when the product still exists upstream.
    pub name: Option<String>,
    pub quantity: u32,
}

/// List the shopper's cart, joined against the live catalog.
#[instrument(skip(state, shopper), fields(session_id = %shopper.id))]
pub async fn list_items(
    State(state): State<AppState>,
    shopper: ShopperSession,
) -> Result<Json<Vec<CartLine>>> {
    let items = CartRepository::new(state.pool()).list(&shopper.id).await?;
    let catalog = state.shipstation().fetch_products().await?;

    Ok(Json(aggregate_lines(&items, &catalog)))
}

/// Add one unit of a product to the shopper's cart.
#[instrument(skip(state, shopper, request), fields(session_id = %shopper.id))]
pub async fn add_item(
    State(state): State<AppState>,
    shopper: ShopperSession,
    Json(request): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartItem>)> {
    let item = CartRepository::new(state.pool())
        .add(&shopper.id, &request.product_id)
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// Collapse unit rows into per-product lines, keeping first-seen order.
///
/// Products missing from the catalog keep their line with `name: None`
/// rather than disappearing from the cart.
fn aggregate_lines(items: &[CartItem], catalog: &[CatalogProduct]) -> Vec<CartLine> {
    let mut lines: Vec<CartLine> = Vec::new();

    for item in items {
        if let Some(line) = lines.iter_mut().find(|l| l.product_id == item.product_id) {
            line.quantity += 1;
            continue;
        }

        let name = item
            .product_id
            .parse::<i64>()
            .ok()
            .map(CatalogProductId::new)
            .and_then(|id| catalog.iter().find(|p| p.id == id))
            .map(|p| p.name.clone());

        lines.push(CartLine {
            product_id: item.product_id.clone(),
            name,
            quantity: 1,
        });
    }

    lines
}
