//! Cookie-backed shopper sessions.
//!
//! Sessions live in the `tower_sessions` table next to the rest of the
//! schema. A shopper id is minted on first contact and persisted, so the
//! same browser keeps the same cart across requests.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use driftwood_core::SessionId;
use sqlx::SqlitePool;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, Session, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::error::AppError;
use crate::models::session::keys;

/// Cookie carrying the session id.
const SESSION_COOKIE_NAME: &str = "dw_session";

/// Sessions expire after a week without activity.
const SESSION_TTL_DAYS: i64 = 7;

/// Build the SQLite-backed session layer.
///
/// Runs the session store's own migration, which creates the
/// `tower_sessions` table. The cookie is only marked `Secure` when the
/// public base URL is served over HTTPS, so local HTTP development keeps
/// working.
///
/// # Errors
///
/// Returns `sqlx::Error` if the session store migration fails.
pub async fn create_session_layer(
    pool: &SqlitePool,
    base_url: &str,
) -> Result<SessionManagerLayer<SqliteStore>, sqlx::Error> {
    let store = SqliteStore::new(pool.clone());
    store.migrate().await?;

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::days(SESSION_TTL_DAYS)))
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_secure(base_url.starts_with("https")))
}

/// The current shopper, resolved from the session cookie.
///
/// Extraction mints a shopper id on first contact and stores it in the
/// session; later requests from the same browser resolve to the same id.
#[derive(Debug, Clone)]
pub struct ShopperSession {
    pub id: SessionId,
}

impl<S> FromRequestParts<S> for ShopperSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, message)| AppError::Internal(message.to_string()))?;

        if let Some(id) = session
            .get::<SessionId>(keys::SHOPPER_ID)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to load session: {e}")))?
        {
            return Ok(Self { id });
        }

        let id = SessionId::generate();
        session
            .insert(keys::SHOPPER_ID, &id)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to persist session: {e}")))?;

        Ok(Self { id })
    }
}
