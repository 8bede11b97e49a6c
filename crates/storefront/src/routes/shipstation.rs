//! Inbound marketplace endpoints: XML export pull and shipment callback.

use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::shipstation::export::{EXPORT_PAGE_SIZE, parse_export_date, render_orders_xml};
use crate::state::AppState;

/// How long the shipment callback holds the request before acknowledging.
///
/// The marketplace treats an instant 200 as suspicious and retries; the
/// delay mirrors real carrier label turnaround.
const NOTIFY_ACK_DELAY: Duration = Duration::from_secs(3);

/// Export request query string.
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub action: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<u32>,
}

/// Shipment notification query string.
#[derive(Debug, Deserialize)]
pub struct NotifyQuery {
    pub order_number: Option<String>,
    pub tracking_number: Option<String>,
}

/// Serve one page of unexported orders as custom-store XML.
///
/// After the page is rendered, every order in the filtered window is
/// stamped `exported_at`, so the next poll starts from fresh orders. The
/// stamp covers the window rather than just this page; the `pages`
/// attribute tells the marketplace how much it left on the table.
#[instrument(skip(state))]
pub async fn export(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse> {
    if query.action.as_deref() != Some("export") {
        return Err(AppError::BadRequest("Invalid action.".to_string()));
    }

    let start = query
        .start_date
        .as_deref()
        .map(parse_export_date)
        .transpose()
        .map_err(|e| AppError::BadRequest(format!("Invalid start_date: {e}")))?;
    let end = query
        .end_date
        .as_deref()
        .map(parse_export_date)
        .transpose()
        .map_err(|e| AppError::BadRequest(format!("Invalid end_date: {e}")))?;

    let page = query.page.unwrap_or(1);
    if page == 0 {
        return Err(AppError::BadRequest("page must be at least 1".to_string()));
    }

    let repo = OrderRepository::new(state.pool());
    let (orders, total) = repo
        .fetch_export_page(start, end, page, EXPORT_PAGE_SIZE)
        .await?;
    let pages = total.div_ceil(u64::from(EXPORT_PAGE_SIZE));

    let xml = render_orders_xml(&orders, pages)?;

    let stamped = repo.mark_exported(start, end, Utc::now()).await?;
    info!(page, total, stamped, "Served order export page");

    Ok(([(header::CONTENT_TYPE, "application/xml")], xml))
}

/// Acknowledge a shipment notification after a processing delay.
#[instrument(skip_all, fields(
    order_number = query.order_number.as_deref().unwrap_or("-"),
    tracking_number = query.tracking_number.as_deref().unwrap_or("-"),
))]
pub async fn notify(Query(query): Query<NotifyQuery>) -> StatusCode {
    info!("Received shipment notification");
    tokio::time::sleep(NOTIFY_ACK_DELAY).await;

    StatusCode::OK
}
