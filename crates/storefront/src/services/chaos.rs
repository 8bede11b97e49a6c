//! Random basket generation for chaos orders.

use driftwood_core::CatalogProduct;
use rand::Rng;

/// Product that rides along on every chaos order.
pub const FORCED_PRODUCT_ID: &str = "36400651";

/// Upper bound on distinct products drawn per chaos order.
pub const MAX_CHAOS_PRODUCTS: usize = 25;

/// Draw a random basket from the catalog.
///
/// Picks between 1 and [`MAX_CHAOS_PRODUCTS`] distinct products (capped by
/// catalog size), then guarantees [`FORCED_PRODUCT_ID`] is present. An
/// empty catalog yields an empty basket; callers skip order placement in
/// that case.
#[must_use]
pub fn pick_product_ids<R: Rng + ?Sized>(rng: &mut R, catalog: &[CatalogProduct]) -> Vec<String> {
    if catalog.is_empty() {
        return Vec::new();
    }

    let count = rng.random_range(1..=catalog.len().min(MAX_CHAOS_PRODUCTS));
    let mut ids: Vec<String> = rand::seq::index::sample(rng, catalog.len(), count)
        .into_iter()
        .map(|i| catalog[i].id.to_string())
        .collect();

    if !ids.iter().any(|id| id == FORCED_PRODUCT_ID) {
        ids.push(FORCED_PRODUCT_ID.to_string());
    }

    ids
}
