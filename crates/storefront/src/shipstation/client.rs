//! Marketplace REST API client.
//!
//! Thin wrapper over the marketplace's JSON endpoints with HTTP basic auth,
//! a short-lived catalog cache, and the bulk mark-as-shipped sweep.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use rand::Rng;
use secrecy::ExposeSecret;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use driftwood_core::CatalogProduct;

use super::ShipStationError;
use super::types::{
    CreateOrderRequest, FailedOrder, MarkShippedRequest, OrdersResponse, ProductsResponse,
    RemoteOrder, ShippedOrder, SweepSummary,
};
use crate::config::MarketplaceConfig;

/// Carrier code submitted with every mark-as-shipped update.
const CARRIER_CODE: &str = "99minutos";

/// Length of generated tracking numbers.
const TRACKING_NUMBER_LEN: usize = 10;

/// How long a fetched catalog stays fresh.
const CATALOG_CACHE_TTL: Duration = Duration::from_secs(20);

/// Cache key for the single catalog entry.
const CATALOG_CACHE_KEY: &str = "products";

/// Marketplace REST API client.
///
/// Cheap to clone; all state lives behind an `Arc`.
///
/// # Credentials
///
/// Requests authenticate with HTTP basic auth. Credentials can be swapped at
/// runtime via [`set_credentials`](Self::set_credentials) without rebuilding
/// the client; the catalog cache is invalidated on swap.
#[derive(Clone)]
pub struct ShipStationClient {
    inner: Arc<ShipStationClientInner>,
}

struct ShipStationClientInner {
    client: reqwest::Client,
    credentials: RwLock<MarketplaceConfig>,
    catalog_cache: Cache<String, Vec<CatalogProduct>>,
}

impl ShipStationClient {
    /// Create a new marketplace client.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. This should never happen
    /// under normal circumstances as we use standard TLS configuration.
    #[must_use]
    pub fn new(credentials: MarketplaceConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        let catalog_cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(CATALOG_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(ShipStationClientInner {
                client,
                credentials: RwLock::new(credentials),
                catalog_cache,
            }),
        }
    }

    /// Swap the active credentials.
    ///
    /// The catalog cache is invalidated since the new credentials may point at
    /// a different marketplace account.
    pub async fn set_credentials(&self, credentials: MarketplaceConfig) {
        *self.inner.credentials.write().await = credentials;
        self.inner.catalog_cache.invalidate_all();
    }

    /// Snapshot the active credentials.
    async fn credentials(&self) -> MarketplaceConfig {
        self.inner.credentials.read().await.clone()
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch the product catalog.
    ///
    /// Results are cached for a short window so bursty callers (the cart view,
    /// the chaotic order generator) do not hammer the marketplace.
    ///
    /// # Errors
    ///
    /// Returns `ShipStationError::RateLimited` on 429, `ShipStationError::Api`
    /// on other non-success statuses, `ShipStationError::Parse` if the payload
    /// does not match, or `ShipStationError::Http` on network failures.
    #[instrument(skip(self))]
    pub async fn fetch_products(&self) -> Result<Vec<CatalogProduct>, ShipStationError> {
        if let Some(products) = self.inner.catalog_cache.get(CATALOG_CACHE_KEY).await {
            debug!("Cache hit for catalog");
            return Ok(products);
        }

        let creds = self.credentials().await;
        let response = self
            .inner
            .client
            .get(format!("{}/products", creds.base_url))
            .basic_auth(&creds.api_key, Some(creds.api_secret.expose_secret()))
            .send()
            .await?;

        let body = check_response(response).await?;
        let parsed: ProductsResponse = serde_json::from_str(&body)?;
        let products: Vec<CatalogProduct> = parsed.products.into_iter().map(Into::into).collect();

        self.inner
            .catalog_cache
            .insert(CATALOG_CACHE_KEY.to_string(), products.clone())
            .await;

        Ok(products)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// List outstanding orders held by the marketplace.
    ///
    /// Single request, no pagination: the sweep operates on whatever the
    /// first page returns.
    ///
    /// # Errors
    ///
    /// Returns `ShipStationError` if the request fails or the payload does not
    /// parse.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<RemoteOrder>, ShipStationError> {
        let creds = self.credentials().await;
        let response = self
            .inner
            .client
            .get(format!("{}/orders", creds.base_url))
            .basic_auth(&creds.api_key, Some(creds.api_secret.expose_secret()))
            .send()
            .await?;

        let body = check_response(response).await?;
        let parsed: OrdersResponse = serde_json::from_str(&body)?;
        Ok(parsed.orders)
    }

    /// Submit a single mark-as-shipped update.
    ///
    /// # Errors
    ///
    /// Returns `ShipStationError` if the request fails.
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn mark_as_shipped(
        &self,
        request: &MarkShippedRequest,
    ) -> Result<(), ShipStationError> {
        let creds = self.credentials().await;
        let response = self
            .inner
            .client
            .post(format!("{}/orders/markasshipped", creds.base_url))
            .basic_auth(&creds.api_key, Some(creds.api_secret.expose_secret()))
            .json(request)
            .send()
            .await?;

        check_response(response).await?;
        Ok(())
    }

    /// Create an order directly on the marketplace.
    ///
    /// # Errors
    ///
    /// Returns `ShipStationError` if the request fails.
    #[instrument(skip(self, request), fields(order_number = %request.order_number))]
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<(), ShipStationError> {
        let creds = self.credentials().await;
        let response = self
            .inner
            .client
            .post(format!("{}/orders/createorder", creds.base_url))
            .basic_auth(&creds.api_key, Some(creds.api_secret.expose_secret()))
            .json(request)
            .send()
            .await?;

        check_response(response).await?;
        Ok(())
    }

    // =========================================================================
    // Mark-As-Shipped Sweep
    // =========================================================================

    /// Mark every outstanding marketplace order as shipped.
    ///
    /// Fetches the remote listing once, then issues one update per order in
    /// listing order, each with a fresh random tracking number. A failed
    /// update is recorded in the summary and the sweep continues to the next
    /// order; only a failed listing fetch aborts the whole operation.
    ///
    /// # Errors
    ///
    /// Returns `ShipStationError` if the initial order listing fails.
    #[instrument(skip(self))]
    pub async fn mark_all_as_shipped(&self) -> Result<SweepSummary, ShipStationError> {
        let orders = self.list_orders().await?;

        let mut summary = SweepSummary {
            attempted: orders.len(),
            shipped: Vec::new(),
            failed: Vec::new(),
        };

        for order in orders {
            let tracking_number = generate_tracking_number();
            let request = MarkShippedRequest {
                order_id: order.order_id,
                carrier_code: CARRIER_CODE.to_string(),
                tracking_number: tracking_number.clone(),
                notify_customer: false,
                notify_sales_channel: false,
            };

            match self.mark_as_shipped(&request).await {
                Ok(()) => {
                    tracing::info!(
                        order_id = %order.order_id,
                        tracking_number = %tracking_number,
                        "Order marked as shipped"
                    );
                    summary.shipped.push(ShippedOrder {
                        order_id: order.order_id,
                        order_number: order.order_number,
                        tracking_number,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        order_id = %order.order_id,
                        error = %e,
                        "Failed to mark order as shipped"
                    );
                    summary.failed.push(FailedOrder {
                        order_id: order.order_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(summary)
    }
}

/// Map a marketplace response to its body, surfacing rate limits and
/// non-success statuses as errors.
async fn check_response(response: reqwest::Response) -> Result<String, ShipStationError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(ShipStationError::RateLimited(retry_after));
    }

    let body = response.text().await?;

    if !status.is_success() {
        tracing::error!(
            status = %status,
            body = %body.chars().take(500).collect::<String>(),
            "Marketplace API returned non-success status"
        );
        return Err(ShipStationError::Api {
            status,
            body: body.chars().take(200).collect(),
        });
    }

    Ok(body)
}

/// Generate a random numeric tracking number.
fn generate_tracking_number() -> String {
    let mut rng = rand::rng();
    (0..TRACKING_NUMBER_LEN)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}
