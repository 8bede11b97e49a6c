//! Cart line database operations.

use sqlx::SqlitePool;

use driftwood_core::SessionId;

use super::RepositoryError;
use crate::models::CartItem;

/// Repository for cart line operations.
pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add one unit of a product to the session's cart.
    ///
    /// Each call stores a new row; quantity is row multiplicity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn add(
        &self,
        session_id: &SessionId,
        product_id: &str,
    ) -> Result<CartItem, RepositoryError> {
        let item = sqlx::query_as::<_, CartItem>(
            r"
            INSERT INTO cart_item (session_id, product_id, created_at)
            VALUES (?, ?, ?)
            RETURNING id, session_id, product_id, created_at
            ",
        )
        .bind(session_id)
        .bind(product_id)
        .bind(chrono::Utc::now())
        .fetch_one(self.pool)
        .await?;

        Ok(item)
    }

    /// List the session's cart lines in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, session_id: &SessionId) -> Result<Vec<CartItem>, RepositoryError> {
        let items = sqlx::query_as::<_, CartItem>(
            r"
            SELECT id, session_id, product_id, created_at
            FROM cart_item
            WHERE session_id = ?
            ORDER BY id
            ",
        )
        .bind(session_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Delete all cart lines owned by the session.
    ///
    /// Returns the number of lines removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear(&self, session_id: &SessionId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_item WHERE session_id = ?")
            .bind(session_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_add_and_list_preserves_insertion_order() {
        let pool = test_pool().await;
        let repo = CartRepository::new(&pool);
        let session = SessionId::generate();

        repo.add(&session, "111").await.unwrap();
        repo.add(&session, "222").await.unwrap();
        repo.add(&session, "333").await.unwrap();

        let items = repo.list(&session).await.unwrap();
        let product_ids: Vec<&str> = items.iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(product_ids, vec!["111", "222", "333"]);
    }

    #[tokio::test]
    async fn test_duplicate_product_adds_second_row() {
        let pool = test_pool().await;
        let repo = CartRepository::new(&pool);
        let session = SessionId::generate();

        repo.add(&session, "36400651").await.unwrap();
        repo.add(&session, "36400651").await.unwrap();

        let items = repo.list(&session).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_ne!(items[0].id, items[1].id);
    }

    #[tokio::test]
    async fn test_clear_only_touches_owning_session() {
        let pool = test_pool().await;
        let repo = CartRepository::new(&pool);
        let mine = SessionId::generate();
        let other = SessionId::generate();

        repo.add(&mine, "111").await.unwrap();
        repo.add(&mine, "222").await.unwrap();
        repo.add(&other, "333").await.unwrap();

        let removed = repo.clear(&mine).await.unwrap();
        assert_eq!(removed, 2);

        assert!(repo.list(&mine).await.unwrap().is_empty());
        assert_eq!(repo.list(&other).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_empty_cart_removes_nothing() {
        let pool = test_pool().await;
        let repo = CartRepository::new(&pool);

        let removed = repo.clear(&SessionId::generate()).await.unwrap();
        assert_eq!(removed, 0);
    }
}
