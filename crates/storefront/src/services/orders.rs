//! Order placement flows.
//!
//! Local orders land in `store_order` and clear the shopper's cart in the
//! same transaction. Marketplace orders go out over the wire first and the
//! cart is only cleared once the marketplace has accepted the order, so a
//! rejection leaves the shopper free to retry.

use chrono::Utc;
use driftwood_core::{CatalogProduct, CatalogProductId, OrderId, SessionId, ShippingAddress};
use sqlx::SqlitePool;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::db::{CartRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::models::{NewOrder, Order};
use crate::shipstation::ShipStationClient;
use crate::shipstation::types::{CreateOrderRequest, OrderLineItem};

/// Warehouse slot reported for every marketplace line item.
const WAREHOUSE_LOCATION: &str = "Shelf A1";

/// Place a local order and clear the shopper's cart atomically.
///
/// # Errors
///
/// Returns `AppError::BadRequest` when `product_ids` is empty, or
/// `AppError::Database` when persistence fails.
#[instrument(skip(pool, shipping_info), fields(session_id = %session_id))]
pub async fn place_order(
    pool: &SqlitePool,
    session_id: &SessionId,
    product_ids: &[String],
    shipping_info: &serde_json::Value,
) -> Result<Order> {
    if product_ids.is_empty() {
        return Err(AppError::BadRequest(
            "product_ids must not be empty".to_string(),
        ));
    }

    let new_order = NewOrder {
        id: OrderId::generate(),
        product_ids: product_ids.to_vec(),
        shipping_info: shipping_info.clone(),
    };

    let order = OrderRepository::new(pool)
        .create_and_clear_cart(session_id, &new_order)
        .await?;

    Ok(order)
}

/// Submit an order to the marketplace, then clear the shopper's cart.
///
/// Every requested product must resolve against the live marketplace
/// catalog; unknown ids reject the whole order before anything is sent.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for an empty or unresolvable product
/// list, `AppError::Marketplace` when the catalog fetch fails, and
/// `AppError::OrderSubmissionFailed` when the marketplace rejects the
/// order itself.
#[instrument(skip_all, fields(session_id = %session_id, product_count = product_ids.len()))]
pub async fn place_marketplace_order(
    pool: &SqlitePool,
    client: &ShipStationClient,
    session_id: &SessionId,
    product_ids: &[String],
    shipping: &ShippingAddress,
) -> Result<()> {
    if product_ids.is_empty() {
        return Err(AppError::BadRequest(
            "product_ids must not be empty".to_string(),
        ));
    }

    let catalog = client.fetch_products().await?;
    let items = build_line_items(product_ids, &catalog)?;

    let request = CreateOrderRequest {
        order_number: OrderId::generate().to_string(),
        order_date: Utc::now().to_rfc3339(),
        order_status: "awaiting_shipment".to_string(),
        bill_to: shipping.clone(),
        ship_to: shipping.clone(),
        items,
    };

    if let Err(error) = client.create_order(&request).await {
        warn!(
            error = %error,
            order_number = %request.order_number,
            "Marketplace rejected the order"
        );
        return Err(AppError::OrderSubmissionFailed);
    }

    CartRepository::new(pool).clear(session_id).await?;

    Ok(())
}

/// Resolve raw product ids against the marketplace catalog.
///
/// Ids that do not parse as integers are treated the same as ids missing
/// from the catalog. Each unit gets its own line item with a fresh key.
fn build_line_items(
    product_ids: &[String],
    catalog: &[CatalogProduct],
) -> Result<Vec<OrderLineItem>> {
    product_ids
        .iter()
        .map(|raw| {
            let product = raw
                .parse::<i64>()
                .ok()
                .map(CatalogProductId::new)
                .and_then(|id| catalog.iter().find(|p| p.id == id))
                .ok_or_else(|| {
                    AppError::BadRequest(format!("Product with ID {raw} not found."))
                })?;

            Ok(OrderLineItem {
                line_item_key: Uuid::new_v4().to_string(),
                name: product.name.clone(),
                sku: product.sku.clone(),
                quantity: 1,
                unit_price: product.price,
                warehouse_location: WAREHOUSE_LOCATION.to_string(),
            })
        })
        .collect()
}
