//! Order and outbox repository contracts, plus the in-memory order store.

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use rocket_core::db::DatabaseError;

use crate::model::{Order, StatusChange};

#[tonic::async_trait]
pub trait OrderRepository: Send + Sync {
    /// Store a new order; an existing id is a conflict.
    async fn insert_order(&self, order: &Order) -> Result<(), DatabaseError>;

    async fn get_order(&self, order_uuid: Uuid) -> Result<Option<Order>, DatabaseError>;

    /// Apply `change` if the stored status still equals `change.from()`.
    ///
    /// Returns `false` when the order is missing or its status moved.
    async fn apply_change(
        &self,
        order_uuid: Uuid,
        change: &StatusChange,
        at: i64,
    ) -> Result<bool, DatabaseError>;
}

/// An event waiting for redelivery to the bus.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct OutboxEntry {
    pub id: i64,
    pub topic: String,
    pub msg_key: String,
    pub payload: Vec<u8>,
    pub attempts: i64,
    pub last_error: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Durable queue of events whose publish failed.
#[tonic::async_trait]
pub trait Outbox: Send + Sync {
    async fn enqueue(
        &self,
        topic: &str,
        key: &str,
        payload: &[u8],
        error: &str,
    ) -> Result<i64, DatabaseError>;

    /// Oldest entries first.
    async fn pending(&self, limit: u32) -> Result<Vec<OutboxEntry>, DatabaseError>;

    async fn remove(&self, id: i64) -> Result<(), DatabaseError>;

    async fn record_failure(&self, id: i64, error: &str) -> Result<(), DatabaseError>;
}

/// Map-backed order store guarded by a reader/writer lock.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<Uuid, Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }
}

#[tonic::async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert_order(&self, order: &Order) -> Result<(), DatabaseError> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.order_uuid) {
            return Err(DatabaseError::Conflict(format!(
                "order {} already exists",
                order.order_uuid
            )));
        }
        orders.insert(order.order_uuid, order.clone());
        Ok(())
    }

    async fn get_order(&self, order_uuid: Uuid) -> Result<Option<Order>, DatabaseError> {
        Ok(self.orders.read().await.get(&order_uuid).cloned())
    }

    async fn apply_change(
        &self,
        order_uuid: Uuid,
        change: &StatusChange,
        at: i64,
    ) -> Result<bool, DatabaseError> {
        let mut orders = self.orders.write().await;
        let Some(order) = orders.get_mut(&order_uuid) else {
            return Ok(false);
        };
        if order.status != change.from() {
            return Ok(false);
        }

        if let StatusChange::Paid {
            transaction_uuid,
            payment_method,
        } = *change
        {
            order.transaction_uuid = Some(transaction_uuid);
            order.payment_method = Some(payment_method);
        }
        order.status = change.to();
        order.updated_at = at;
        Ok(true)
    }
}
