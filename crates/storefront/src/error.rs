//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Responses are JSON objects with an `error` key (the rate-limit reject uses
//! `message`, matching what the order generator clients expect).

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::shipstation::{ExportError, ShipStationError};

/// Response body for throttled order-generator calls.
const RATE_LIMIT_MESSAGE: &str =
    "Rate limiting # of orders that can be generated. Is someone else also running this?";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Marketplace API operation failed.
    #[error("Marketplace error: {0}")]
    Marketplace(#[from] ShipStationError),

    /// Order export document could not be produced.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// The marketplace rejected an order submission.
    #[error("Order submission failed")]
    OrderSubmissionFailed,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::Marketplace(_) | Self::Export(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) | Self::Export(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Marketplace(_) | Self::OrderSubmissionFailed => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) | Self::Export(_) => {
                "Internal server error".to_string()
            }
            Self::Marketplace(_) => "Marketplace request failed.".to_string(),
            Self::OrderSubmissionFailed => {
                "Failed to place the order. Please try again.".to_string()
            }
            Self::RateLimited => RATE_LIMIT_MESSAGE.to_string(),
            Self::NotFound(msg) | Self::BadRequest(msg) => msg.clone(),
        };

        let body = match &self {
            Self::RateLimited => serde_json::json!({ "message": message }),
            _ => serde_json::json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
