//! Marketplace maintenance route handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, instrument};

use crate::db::{SettingsRepository, StoredMarketplaceCredentials};
use crate::error::Result;
use crate::shipstation::SweepSummary;
use crate::state::AppState;

/// Credential rotation request body.
#[derive(Deserialize)]
pub struct SaveConfigRequest {
    pub api_key: String,
    pub api_secret: String,
    /// Defaults to the configured marketplace URL when omitted.
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Sweep response body; the summary fields sit next to the message.
#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub summary: SweepSummary,
}

/// Mark every open marketplace order as shipped.
///
/// Responds 200 when the whole sweep succeeds and 207 when some orders
/// could not be updated; the body lists both groups either way.
#[instrument(skip(state))]
pub async fn sweep(State(state): State<AppState>) -> Result<Response> {
    let summary = state.shipstation().mark_all_as_shipped().await?;

    let status = if summary.is_fully_successful() {
        StatusCode::OK
    } else {
        StatusCode::MULTI_STATUS
    };

    let body = SweepResponse {
        message: "All orders processed for shipment!",
        summary,
    };

    Ok((status, Json(body)).into_response())
}

/// Rotate the marketplace credentials.
///
/// Persists the new credentials so they survive restarts, then swaps them
/// into the live client. Subsequent marketplace calls use the new values.
#[instrument(skip(state, request))]
pub async fn save_config(
    State(state): State<AppState>,
    Json(request): Json<SaveConfigRequest>,
) -> Result<Json<Value>> {
    let credentials = StoredMarketplaceCredentials {
        api_key: request.api_key,
        api_secret: request.api_secret,
        base_url: request
            .base_url
            .unwrap_or_else(|| state.config().marketplace.base_url.clone()),
    };

    SettingsRepository::new(state.pool())
        .set_marketplace_credentials(&credentials)
        .await?;
    state.shipstation().set_credentials(credentials.into()).await;

    info!("Marketplace credentials rotated");

    Ok(Json(json!({"message": "Configuration saved."})))
}
