//! Order database operations.
//!
//! Orders and the cart-clear that follows a placement commit in a single
//! transaction, so a failed insert never leaves a half-cleared cart.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use driftwood_core::{OrderId, SessionId};

use super::RepositoryError;
use crate::models::{NewOrder, Order};

/// Repository for order operations.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert an order and clear the session's cart in one transaction.
    ///
    /// `shipped` is set at creation: locally stored orders exist only to be
    /// picked up by the marketplace export feed, which treats them as already
    /// fulfilled.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order ID already exists,
    /// `RepositoryError::DataCorruption` if the shipping document cannot be
    /// serialized, or `RepositoryError::Database` for other failures. On any
    /// error the whole transaction rolls back and the cart is untouched.
    pub async fn create_and_clear_cart(
        &self,
        session_id: &SessionId,
        input: &NewOrder,
    ) -> Result<Order, RepositoryError> {
        let shipping_info = serde_json::to_string(&input.shipping_info).map_err(|e| {
            RepositoryError::DataCorruption(format!("shipping_info not serializable: {e}"))
        })?;
        let product_ids = input.product_ids.join(",");

        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>(
            r"
            INSERT INTO store_order (id, product_ids, shipping_info, created_at, shipped)
            VALUES (?, ?, ?, ?, TRUE)
            RETURNING id, product_ids, shipping_info, created_at, shipped, exported_at
            ",
        )
        .bind(&input.id)
        .bind(&product_ids)
        .bind(&shipping_info)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!("order {} already exists", input.id));
            }
            RepositoryError::Database(e)
        })?;

        sqlx::query("DELETE FROM cart_item WHERE session_id = ?")
            .bind(session_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(order)
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            r"
            SELECT id, product_ids, shipping_info, created_at, shipped, exported_at
            FROM store_order
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// Fetch one page of unexported orders in the given creation window.
    ///
    /// Rows are ordered by `(created_at, id)` so pagination is stable across
    /// requests. Returns the page plus the total number of matching rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn fetch_export_page(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<Order>, u64), RepositoryError> {
        let offset = i64::from(page.saturating_sub(1)) * i64::from(per_page);

        let orders = sqlx::query_as::<_, Order>(
            r"
            SELECT id, product_ids, shipping_info, created_at, shipped, exported_at
            FROM store_order
            WHERE exported_at IS NULL
              AND (?1 IS NULL OR created_at >= ?1)
              AND (?2 IS NULL OR created_at <= ?2)
            ORDER BY created_at, id
            LIMIT ?3 OFFSET ?4
            ",
        )
        .bind(start)
        .bind(end)
        .bind(i64::from(per_page))
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*)
            FROM store_order
            WHERE exported_at IS NULL
              AND (?1 IS NULL OR created_at >= ?1)
              AND (?2 IS NULL OR created_at <= ?2)
            ",
        )
        .bind(start)
        .bind(end)
        .fetch_one(self.pool)
        .await?;

        let total = u64::try_from(total)
            .map_err(|_| RepositoryError::DataCorruption("negative COUNT(*)".to_string()))?;

        Ok((orders, total))
    }

    /// Stamp every unexported order in the window as exported.
    ///
    /// Covers the entire filtered set, not just the page that was rendered,
    /// so a feed poller cannot receive the same order twice.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_exported(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        exported_at: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE store_order
            SET exported_at = ?1
            WHERE exported_at IS NULL
              AND (?2 IS NULL OR created_at >= ?2)
              AND (?3 IS NULL OR created_at <= ?3)
            ",
        )
        .bind(exported_at)
        .bind(start)
        .bind(end)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::db::{CartRepository, test_pool};

    fn new_order(product_ids: &[&str]) -> NewOrder {
        NewOrder {
            id: OrderId::generate(),
            product_ids: product_ids.iter().map(ToString::to_string).collect(),
            shipping_info: json!({"name": "Catalina Reyes", "country": "MX"}),
        }
    }

    #[tokio::test]
    async fn test_create_order_clears_only_own_cart() {
        let pool = test_pool().await;
        let carts = CartRepository::new(&pool);
        let orders = OrderRepository::new(&pool);
        let mine = SessionId::generate();
        let other = SessionId::generate();

        carts.add(&mine, "111").await.unwrap();
        carts.add(&mine, "222").await.unwrap();
        carts.add(&other, "333").await.unwrap();

        let order = orders
            .create_and_clear_cart(&mine, &new_order(&["111", "222"]))
            .await
            .unwrap();

        assert_eq!(order.product_ids, "111,222");
        assert!(order.shipped);
        assert!(order.exported_at.is_none());
        assert!(carts.list(&mine).await.unwrap().is_empty());
        assert_eq!(carts.list(&other).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_order_id_rolls_back_cart_clear() {
        let pool = test_pool().await;
        let carts = CartRepository::new(&pool);
        let orders = OrderRepository::new(&pool);
        let session = SessionId::generate();

        carts.add(&session, "111").await.unwrap();

        let input = new_order(&["111"]);
        orders.create_and_clear_cart(&session, &input).await.unwrap();

        // Same ID again: the insert conflicts and the whole transaction,
        // including the cart clear, must roll back.
        carts.add(&session, "222").await.unwrap();
        let err = orders
            .create_and_clear_cart(&session, &input)
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(carts.list(&session).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_shipping_info_round_trips_as_json() {
        let pool = test_pool().await;
        let orders = OrderRepository::new(&pool);
        let session = SessionId::generate();

        let input = new_order(&["36400651"]);
        let created = orders.create_and_clear_cart(&session, &input).await.unwrap();

        let fetched = orders.get(&created.id).await.unwrap().unwrap();
        let document: serde_json::Value = serde_json::from_str(&fetched.shipping_info).unwrap();
        assert_eq!(document["name"], "Catalina Reyes");
    }

    #[tokio::test]
    async fn test_get_missing_order_returns_none() {
        let pool = test_pool().await;
        let orders = OrderRepository::new(&pool);

        let found = orders.get(&OrderId::generate()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_export_paging_covers_all_rows() {
        let pool = test_pool().await;
        let orders = OrderRepository::new(&pool);
        let session = SessionId::generate();

        for _ in 0..75 {
            orders
                .create_and_clear_cart(&session, &new_order(&["111"]))
                .await
                .unwrap();
        }

        let (first, total) = orders.fetch_export_page(None, None, 1, 50).await.unwrap();
        assert_eq!(first.len(), 50);
        assert_eq!(total, 75);

        let (second, _) = orders.fetch_export_page(None, None, 2, 50).await.unwrap();
        assert_eq!(second.len(), 25);

        // Pages must not overlap.
        let first_ids: Vec<_> = first.iter().map(|o| o.id.clone()).collect();
        assert!(second.iter().all(|o| !first_ids.contains(&o.id)));
    }

    #[tokio::test]
    async fn test_mark_exported_stamps_entire_window() {
        let pool = test_pool().await;
        let orders = OrderRepository::new(&pool);
        let session = SessionId::generate();

        for _ in 0..60 {
            orders
                .create_and_clear_cart(&session, &new_order(&["111"]))
                .await
                .unwrap();
        }

        // Stamps all 60, not just the 50 a single page would have shown.
        let stamped = orders.mark_exported(None, None, Utc::now()).await.unwrap();
        assert_eq!(stamped, 60);

        let (rows, total) = orders.fetch_export_page(None, None, 1, 50).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(total, 0);

        // A second stamp finds nothing left.
        let stamped = orders.mark_exported(None, None, Utc::now()).await.unwrap();
        assert_eq!(stamped, 0);
    }

    #[tokio::test]
    async fn test_export_window_filters_by_created_at() {
        let pool = test_pool().await;
        let orders = OrderRepository::new(&pool);

        let timestamps = [
            Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 5, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 9, 10, 0, 0).unwrap(),
        ];
        for (i, created_at) in timestamps.iter().enumerate() {
            sqlx::query(
                r"
                INSERT INTO store_order (id, product_ids, shipping_info, created_at, shipped)
                VALUES (?, ?, '{}', ?, TRUE)
                ",
            )
            .bind(OrderId::generate())
            .bind(format!("{i}"))
            .bind(created_at)
            .execute(&pool)
            .await
            .unwrap();
        }

        let start = Some(Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap());
        let end = Some(Utc.with_ymd_and_hms(2026, 3, 8, 0, 0, 0).unwrap());

        let (rows, total) = orders.fetch_export_page(start, end, 1, 50).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].product_ids, "1");

        // Stamping honors the same window.
        let stamped = orders.mark_exported(start, end, Utc::now()).await.unwrap();
        assert_eq!(stamped, 1);

        let (rows, _) = orders.fetch_export_page(None, None, 1, 50).await.unwrap();
        assert_eq!(rows.len(), 2);
    }
}
