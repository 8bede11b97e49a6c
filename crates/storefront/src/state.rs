//! Shared application state.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::StorefrontConfig;
use crate::services::address_book::AddressBook;
use crate::services::throttle::SubmissionThrottle;
use crate::shipstation::ShipStationClient;

/// State handed to every request handler.
///
/// Cheap to clone; everything lives behind a single `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: SqlitePool,
    shipstation: ShipStationClient,
    address_book: AddressBook,
    throttle: SubmissionThrottle,
}

impl AppState {
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        pool: SqlitePool,
        shipstation: ShipStationClient,
        address_book: AddressBook,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                shipstation,
                address_book,
                throttle: SubmissionThrottle::new(),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    #[must_use]
    pub fn shipstation(&self) -> &ShipStationClient {
        &self.inner.shipstation
    }

    #[must_use]
    pub fn address_book(&self) -> &AddressBook {
        &self.inner.address_book
    }

    #[must_use]
    pub fn throttle(&self) -> &SubmissionThrottle {
        &self.inner.throttle
    }
}
