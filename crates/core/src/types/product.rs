//! Marketplace catalog products.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::CatalogProductId;

/// A product as listed by the marketplace catalog.
///
/// The marketplace is the source of truth for products; this is the trimmed
/// view the storefront works with. Carts and orders reference products by the
/// decimal string form of [`id`](Self::id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: CatalogProductId,
    pub name: String,
    pub sku: String,
    pub price: Decimal,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_numeric_price() {
        let product: CatalogProduct = serde_json::from_str(
            r#"{"id":36400651,"name":"Canvas Tote","sku":"TOTE-01","price":12.34}"#,
        )
        .unwrap();

        assert_eq!(product.id, CatalogProductId::new(36_400_651));
        assert_eq!(product.price, "12.34".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_id_string_form() {
        let product = CatalogProduct {
            id: CatalogProductId::new(36_400_651),
            name: "Canvas Tote".to_owned(),
            sku: "TOTE-01".to_owned(),
            price: Decimal::ZERO,
        };

        assert_eq!(product.id.to_string(), "36400651");
    }
}
