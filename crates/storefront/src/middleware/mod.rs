//! Request middleware.

pub mod session;

pub use session::{ShopperSession, create_session_layer};
