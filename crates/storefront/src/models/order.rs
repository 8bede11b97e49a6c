//! Order models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use driftwood_core::OrderId;

/// A placed order staged for marketplace pickup.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    /// Generated order token.
    pub id: OrderId,
    /// Comma-joined marketplace product identifiers.
    pub product_ids: String,
    /// Shipping address document (JSON).
    pub shipping_info: String,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// Whether the order is already considered shipped.
    pub shipped: bool,
    /// When the order was picked up by the marketplace export feed.
    pub exported_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Product identifiers split out of the stored comma-joined form.
    #[must_use]
    pub fn product_id_list(&self) -> Vec<&str> {
        self.product_ids
            .split(',')
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Input for creating an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Pre-generated order token.
    pub id: OrderId,
    /// Product identifiers in cart order.
    pub product_ids: Vec<String>,
    /// Shipping address document.
    pub shipping_info: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn order_with_products(product_ids: &str) -> Order {
        Order {
            id: OrderId::generate(),
            product_ids: product_ids.to_string(),
            shipping_info: "{}".to_string(),
            created_at: Utc::now(),
            shipped: true,
            exported_at: None,
        }
    }

    #[test]
    fn test_product_id_list_splits_on_commas() {
        let order = order_with_products("36400651,12345,36400651");
        assert_eq!(order.product_id_list(), vec!["36400651", "12345", "36400651"]);
    }

    #[test]
    fn test_product_id_list_empty_string_yields_nothing() {
        let order = order_with_products("");
        assert!(order.product_id_list().is_empty());
    }
}
