//! Cart line models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use driftwood_core::{CartItemId, SessionId};

/// A single unit of a product in a shopper's cart.
///
/// Quantity is represented by row multiplicity: adding the same product
/// twice stores two rows.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartItem {
    /// Unique cart line ID.
    pub id: CartItemId,
    /// Session that owns the line.
    pub session_id: SessionId,
    /// Marketplace product identifier (decimal string).
    pub product_id: String,
    /// When the line was added.
    pub created_at: DateTime<Utc>,
}
