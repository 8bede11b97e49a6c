//! Wire types for the marketplace REST API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use driftwood_core::{CatalogProduct, CatalogProductId, MarketplaceOrderId, ShippingAddress};

// =============================================================================
// Catalog
// =============================================================================

/// Response wrapper for `GET /products`.
#[derive(Debug, Deserialize)]
pub struct ProductsResponse {
    /// Products on this page.
    #[serde(default)]
    pub products: Vec<ProductRecord>,
}

/// A product as returned by the marketplace catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// Numeric product ID.
    pub product_id: i64,
    /// Display name.
    pub name: String,
    /// Stock keeping unit.
    pub sku: Option<String>,
    /// Unit price.
    pub price: Option<Decimal>,
}

impl From<ProductRecord> for CatalogProduct {
    fn from(record: ProductRecord) -> Self {
        Self {
            id: CatalogProductId::new(record.product_id),
            name: record.name,
            sku: record.sku.unwrap_or_default(),
            price: record.price.unwrap_or_default(),
        }
    }
}

// =============================================================================
// Remote Orders
// =============================================================================

/// Response wrapper for `GET /orders`.
#[derive(Debug, Deserialize)]
pub struct OrdersResponse {
    /// Outstanding orders.
    #[serde(default)]
    pub orders: Vec<RemoteOrder>,
}

/// An order held by the marketplace.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteOrder {
    /// Marketplace order ID.
    pub order_id: MarketplaceOrderId,
    /// Human-facing order number.
    pub order_number: Option<String>,
    /// Current status (e.g., `awaiting_shipment`).
    pub order_status: Option<String>,
}

/// Request body for `POST /orders/markasshipped`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkShippedRequest {
    /// Marketplace order ID.
    pub order_id: MarketplaceOrderId,
    /// Carrier the shipment left with.
    pub carrier_code: String,
    /// Tracking number for the shipment.
    pub tracking_number: String,
    /// Whether the marketplace should email the buyer.
    pub notify_customer: bool,
    /// Whether the marketplace should notify the originating channel.
    pub notify_sales_channel: bool,
}

// =============================================================================
// Outbound Orders
// =============================================================================

/// A single line in an outbound order.
///
/// Field casing is what the marketplace order intake expects; note the mix of
/// camelCase and PascalCase.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLineItem {
    /// Unique key for this line.
    #[serde(rename = "lineItemKey")]
    pub line_item_key: String,
    /// Product display name.
    #[serde(rename = "Name")]
    pub name: String,
    /// Stock keeping unit.
    #[serde(rename = "SKU")]
    pub sku: String,
    /// Units of this product.
    #[serde(rename = "Quantity")]
    pub quantity: u32,
    /// Price per unit, serialized as a JSON number.
    #[serde(rename = "UnitPrice", with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    /// Pick location hint.
    #[serde(rename = "WarehouseLocation")]
    pub warehouse_location: String,
}

/// Request body for `POST /orders/createorder`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Local order token, surfaced as the marketplace order number.
    pub order_number: String,
    /// Placement time, RFC 3339.
    pub order_date: String,
    /// Initial status.
    pub order_status: String,
    /// Billing address (same document as shipping).
    pub bill_to: ShippingAddress,
    /// Shipping address.
    pub ship_to: ShippingAddress,
    /// Order lines.
    pub items: Vec<OrderLineItem>,
}

// =============================================================================
// Sweep Summary
// =============================================================================

/// Outcome of one full mark-as-shipped sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepSummary {
    /// How many orders the remote listing returned.
    pub attempted: usize,
    /// Orders successfully marked as shipped.
    pub shipped: Vec<ShippedOrder>,
    /// Orders whose update failed; the sweep continued past each one.
    pub failed: Vec<FailedOrder>,
}

impl SweepSummary {
    /// True when every attempted order was marked as shipped.
    #[must_use]
    pub fn is_fully_successful(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A successfully updated order.
#[derive(Debug, Clone, Serialize)]
pub struct ShippedOrder {
    /// Marketplace order ID.
    pub order_id: MarketplaceOrderId,
    /// Human-facing order number, when the listing included one.
    pub order_number: Option<String>,
    /// Tracking number submitted with the update.
    pub tracking_number: String,
}

/// An order whose update failed.
#[derive(Debug, Clone, Serialize)]
pub struct FailedOrder {
    /// Marketplace order ID.
    pub order_id: MarketplaceOrderId,
    /// Why the update failed.
    pub error: String,
}
