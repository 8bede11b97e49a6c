//! Session-related types.
//!
//! Keys for values stored in the shopper's session.

/// Session keys for shopper state.
pub mod keys {
    /// Key for the stable shopper identifier.
    pub const SHOPPER_ID: &str = "shopper_id";
}
