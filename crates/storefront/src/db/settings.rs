//! Settings database operations.
//!
//! Stores runtime-editable overrides as JSON documents keyed by a dotted
//! setting name. Currently holds only the marketplace credential override.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::RepositoryError;
use crate::config::MarketplaceConfig;

/// Setting key for the marketplace credential override.
const MARKETPLACE_CREDENTIALS_KEY: &str = "marketplace.credentials";

/// Marketplace credentials as stored in the settings table.
///
/// Implements `Debug` manually to redact the secret field.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoredMarketplaceCredentials {
    /// API key (basic auth username).
    pub api_key: String,
    /// API secret (basic auth password).
    pub api_secret: String,
    /// Base URL without trailing slash.
    pub base_url: String,
}

impl std::fmt::Debug for StoredMarketplaceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredMarketplaceCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl From<StoredMarketplaceCredentials> for MarketplaceConfig {
    fn from(stored: StoredMarketplaceCredentials) -> Self {
        Self {
            api_key: stored.api_key,
            api_secret: SecretString::from(stored.api_secret),
            base_url: stored.base_url,
        }
    }
}

/// Repository for settings operations.
pub struct SettingsRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch the stored marketplace credential override, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the stored document does
    /// not parse, or `RepositoryError::Database` if the query fails.
    pub async fn marketplace_credentials(
        &self,
    ) -> Result<Option<StoredMarketplaceCredentials>, RepositoryError> {
        let raw: Option<String> = sqlx::query_scalar("SELECT value FROM setting WHERE key = ?")
            .bind(MARKETPLACE_CREDENTIALS_KEY)
            .fetch_optional(self.pool)
            .await?;

        raw.map(|json| {
            serde_json::from_str(&json).map_err(|e| {
                RepositoryError::DataCorruption(format!(
                    "setting {MARKETPLACE_CREDENTIALS_KEY}: {e}"
                ))
            })
        })
        .transpose()
    }

    /// Store marketplace credentials, replacing any previous override.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn set_marketplace_credentials(
        &self,
        credentials: &StoredMarketplaceCredentials,
    ) -> Result<(), RepositoryError> {
        let value = serde_json::to_string(credentials)
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        sqlx::query(
            r"
            INSERT INTO setting (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
        )
        .bind(MARKETPLACE_CREDENTIALS_KEY)
        .bind(&value)
        .bind(chrono::Utc::now())
        .execute(self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn credentials(key: &str) -> StoredMarketplaceCredentials {
        StoredMarketplaceCredentials {
            api_key: key.to_string(),
            api_secret: "s3cr3t-value".to_string(),
            base_url: "http://localhost:9999".to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_override_returns_none() {
        let pool = test_pool().await;
        let repo = SettingsRepository::new(&pool);

        assert!(repo.marketplace_credentials().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_then_fetch_round_trips() {
        let pool = test_pool().await;
        let repo = SettingsRepository::new(&pool);

        repo.set_marketplace_credentials(&credentials("first-key"))
            .await
            .unwrap();

        let stored = repo.marketplace_credentials().await.unwrap().unwrap();
        assert_eq!(stored.api_key, "first-key");
        assert_eq!(stored.base_url, "http://localhost:9999");
    }

    #[tokio::test]
    async fn test_second_set_replaces_first() {
        let pool = test_pool().await;
        let repo = SettingsRepository::new(&pool);

        repo.set_marketplace_credentials(&credentials("first-key"))
            .await
            .unwrap();
        repo.set_marketplace_credentials(&credentials("second-key"))
            .await
            .unwrap();

        let stored = repo.marketplace_credentials().await.unwrap().unwrap();
        assert_eq!(stored.api_key, "second-key");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug_output = format!("{:?}", credentials("visible-key"));
        assert!(debug_output.contains("visible-key"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("s3cr3t-value"));
    }
}
