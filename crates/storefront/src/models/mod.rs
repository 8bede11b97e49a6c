//! Domain models for the storefront.

pub mod cart;
pub mod order;
pub mod session;

pub use cart::CartItem;
pub use order::{NewOrder, Order};
