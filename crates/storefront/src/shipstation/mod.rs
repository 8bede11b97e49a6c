//! Marketplace shipping platform integration.
//!
//! Two directions of traffic share this module:
//!
//! - **Outbound**: a REST client ([`ShipStationClient`]) for the marketplace
//!   API: catalog reads, direct order creation, and the bulk mark-as-shipped
//!   sweep.
//! - **Inbound**: the custom-store export protocol ([`export`]) that renders
//!   locally placed orders as the XML feed the marketplace polls.
//!
//! # Credentials
//!
//! The client authenticates with HTTP basic auth. Credentials start from the
//! environment and can be overridden at runtime via the settings store; the
//! override survives restarts.

pub mod client;
pub mod export;
pub mod types;

pub use client::ShipStationClient;
pub use export::{ExportError, parse_export_date, render_orders_xml};
pub use types::{FailedOrder, RemoteOrder, ShippedOrder, SweepSummary};

use thiserror::Error;

/// Errors that can occur when interacting with the marketplace API.
#[derive(Debug, Error)]
pub enum ShipStationError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the marketplace.
    #[error("API error {status}: {body}")]
    Api {
        /// HTTP status returned by the marketplace.
        status: reqwest::StatusCode,
        /// Response body, truncated for logging.
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rate limited by the marketplace.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}
