//! Order placement flows and their supporting pieces.

pub mod address_book;
pub mod chaos;
pub mod orders;
pub mod throttle;
