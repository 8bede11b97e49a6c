//! Integration test harness for Driftwood Supply.
//!
//! Tests drive the storefront router in process: requests pass through the
//! real session layer, handlers, and an in-memory `SQLite` database, with
//! the marketplace stood in for by an HTTP mock per test.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p driftwood-integration-tests
//! ```

use std::net::IpAddr;
use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use axum::response::Response;
use driftwood_storefront::config::{MarketplaceConfig, StorefrontConfig};
use driftwood_storefront::db;
use driftwood_storefront::middleware::create_session_layer;
use driftwood_storefront::routes;
use driftwood_storefront::services::address_book::AddressBook;
use driftwood_storefront::shipstation::ShipStationClient;
use driftwood_storefront::state::AppState;
use secrecy::SecretString;
use serde_json::Value;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tower::util::ServiceExt;

/// The bundled persona file, resolved relative to this crate.
fn address_book_path() -> PathBuf {
    PathBuf::from(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../storefront/static/addresses.yml"
    ))
}

/// Test configuration pointing the marketplace client at `marketplace_url`.
fn test_config(marketplace_url: &str) -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("sqlite::memory:"),
        host: IpAddr::from([127, 0, 0, 1]),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        marketplace: MarketplaceConfig {
            api_key: "test-key".to_string(),
            api_secret: SecretString::from("test-secret"),
            base_url: marketplace_url.trim_end_matches('/').to_string(),
        },
        address_book_path: address_book_path(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A storefront wired to a fresh in-memory database, plus a cookie jar so
/// consecutive requests share one shopper session.
pub struct TestApp {
    router: Router,
    pool: SqlitePool,
    cookie: Option<String>,
}

impl TestApp {
    /// Stand up the full router against a fresh in-memory database.
    ///
    /// # Panics
    ///
    /// Panics if the database or session store cannot be initialized.
    pub async fn spawn(marketplace_url: &str) -> Self {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");
        db::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let config = test_config(marketplace_url);
        let shipstation = ShipStationClient::new(config.marketplace.clone());
        let address_book =
            AddressBook::load(&config.address_book_path).expect("Failed to load address book");

        let session_layer = create_session_layer(&pool, &config.base_url)
            .await
            .expect("Failed to initialize session store");

        let state = AppState::new(config, pool.clone(), shipstation, address_book);
        let router = routes::routes().layer(session_layer).with_state(state);

        Self {
            router,
            pool,
            cookie: None,
        }
    }

    /// Direct access to the backing database.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Forget the session cookie, simulating a different shopper.
    pub fn clear_session(&mut self) {
        self.cookie = None;
    }

    /// Send a request, carrying the session cookie across calls.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be routed.
    pub async fn send(&mut self, mut request: Request<Body>) -> Response {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().expect("Cookie is ASCII"));
        }

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let value = set_cookie.to_str().expect("Set-Cookie is ASCII");
            if let Some(pair) = value.split(';').next() {
                self.cookie = Some(pair.to_string());
            }
        }

        response
    }

    /// GET `uri`.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or routed.
    pub async fn get(&mut self, uri: &str) -> Response {
        self.send(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("Request is well formed"),
        )
        .await
    }

    /// POST `uri` with a JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or routed.
    pub async fn post_json(&mut self, uri: &str, body: &Value) -> Response {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("Request is well formed"),
        )
        .await
    }

    /// POST `uri` with an empty body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or routed.
    pub async fn post(&mut self, uri: &str) -> Response {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .expect("Request is well formed"),
        )
        .await
    }
}

/// Read a response body as a JSON document.
///
/// # Panics
///
/// Panics if the body is not valid JSON.
pub async fn read_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Body is readable");
    serde_json::from_slice(&bytes).expect("Body is JSON")
}

/// Read a response body as text.
///
/// # Panics
///
/// Panics if the body is not valid UTF-8.
pub async fn read_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Body is readable");
    String::from_utf8(bytes.to_vec()).expect("Body is UTF-8")
}
