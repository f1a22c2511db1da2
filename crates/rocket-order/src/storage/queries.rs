//! Order and outbox queries.

use uuid::Uuid;

use super::db::OrderDatabase;
use super::models::OrderRow;
use crate::model::{Order, StatusChange};
use crate::repository::{OrderRepository, Outbox, OutboxEntry};
use rocket_core::db::{DatabaseError, unix_timestamp};

impl OrderDatabase {
    // =========================================================================
    // Orders
    // =========================================================================

    pub async fn create_order(&self, order: &Order) -> Result<(), DatabaseError> {
        let part_uuids = serde_json::to_string(&order.part_uuids)
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        sqlx::query(
            "INSERT INTO orders (order_uuid, user_uuid, part_uuids, total_price, transaction_uuid, \
             payment_method, status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(order.order_uuid.to_string())
        .bind(order.user_uuid.to_string())
        .bind(part_uuids)
        .bind(order.total_price)
        .bind(order.transaction_uuid.map(|id| id.to_string()))
        .bind(order.payment_method.map(|m| m.as_str()))
        .bind(order.status.as_str())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn fetch_order(&self, order_uuid: Uuid) -> Result<Option<Order>, DatabaseError> {
        sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE order_uuid = ?")
            .bind(order_uuid.to_string())
            .fetch_optional(self.pool())
            .await?
            .map(Order::try_from)
            .transpose()
    }

    /// Single `UPDATE` guarded by the expected current status.
    pub async fn update_status(
        &self,
        order_uuid: Uuid,
        change: &StatusChange,
        at: i64,
    ) -> Result<bool, DatabaseError> {
        let (transaction_uuid, payment_method) = match change {
            StatusChange::Paid {
                transaction_uuid,
                payment_method,
            } => (
                Some(transaction_uuid.to_string()),
                Some(payment_method.as_str()),
            ),
            StatusChange::Cancelled | StatusChange::Assembled => (None, None),
        };

        let result = sqlx::query(
            "UPDATE orders SET status = ?, \
             transaction_uuid = COALESCE(?, transaction_uuid), \
             payment_method = COALESCE(?, payment_method), \
             updated_at = ? \
             WHERE order_uuid = ? AND status = ?",
        )
        .bind(change.to().as_str())
        .bind(transaction_uuid)
        .bind(payment_method)
        .bind(at)
        .bind(order_uuid.to_string())
        .bind(change.from().as_str())
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn count_orders(&self) -> Result<u64, DatabaseError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
            .fetch_one(self.pool())
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    // =========================================================================
    // Outbox
    // =========================================================================

    pub async fn enqueue_event(
        &self,
        topic: &str,
        key: &str,
        payload: &[u8],
        error: &str,
    ) -> Result<i64, DatabaseError> {
        let now = unix_timestamp();
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO order_outbox (topic, msg_key, payload, attempts, last_error, created_at, updated_at) \
             VALUES (?, ?, ?, 1, ?, ?, ?) RETURNING id",
        )
        .bind(topic)
        .bind(key)
        .bind(payload)
        .bind(error)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool())
        .await?;

        Ok(id)
    }

    pub async fn pending_events(&self, limit: u32) -> Result<Vec<OutboxEntry>, DatabaseError> {
        let entries =
            sqlx::query_as::<_, OutboxEntry>("SELECT * FROM order_outbox ORDER BY id ASC LIMIT ?")
                .bind(limit)
                .fetch_all(self.pool())
                .await?;

        Ok(entries)
    }

    pub async fn delete_event(&self, id: i64) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM order_outbox WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(())
    }

    pub async fn mark_event_failed(&self, id: i64, error: &str) -> Result<(), DatabaseError> {
        sqlx::query(
            "UPDATE order_outbox SET attempts = attempts + 1, last_error = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(error)
        .bind(unix_timestamp())
        .bind(id)
        .execute(self.pool())
        .await?;

        Ok(())
    }
}

#[tonic::async_trait]
impl OrderRepository for OrderDatabase {
    async fn insert_order(&self, order: &Order) -> Result<(), DatabaseError> {
        self.create_order(order).await
    }

    async fn get_order(&self, order_uuid: Uuid) -> Result<Option<Order>, DatabaseError> {
        self.fetch_order(order_uuid).await
    }

    async fn apply_change(
        &self,
        order_uuid: Uuid,
        change: &StatusChange,
        at: i64,
    ) -> Result<bool, DatabaseError> {
        self.update_status(order_uuid, change, at).await
    }
}

#[tonic::async_trait]
impl Outbox for OrderDatabase {
    async fn enqueue(
        &self,
        topic: &str,
        key: &str,
        payload: &[u8],
        error: &str,
    ) -> Result<i64, DatabaseError> {
        self.enqueue_event(topic, key, payload, error).await
    }

    async fn pending(&self, limit: u32) -> Result<Vec<OutboxEntry>, DatabaseError> {
        self.pending_events(limit).await
    }

    async fn remove(&self, id: i64) -> Result<(), DatabaseError> {
        self.delete_event(id).await
    }

    async fn record_failure(&self, id: i64, error: &str) -> Result<(), DatabaseError> {
        self.mark_event_failed(id, error).await
    }
}
