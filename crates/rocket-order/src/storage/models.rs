//! Row mapping for the `orders` table.

use uuid::Uuid;

use rocket_core::db::DatabaseError;

use crate::model::{Order, OrderStatus, PaymentMethod};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub order_uuid: String,
    pub user_uuid: String,
    pub part_uuids: String,
    pub total_price: f64,
    pub transaction_uuid: Option<String>,
    pub payment_method: Option<String>,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

fn corrupt(column: &str, e: impl std::fmt::Display) -> DatabaseError {
    DatabaseError::Query(format!("corrupt {column}: {e}"))
}

fn parse_id(value: &str, column: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(value).map_err(|e| corrupt(column, e))
}

impl TryFrom<OrderRow> for Order {
    type Error = DatabaseError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let part_uuids: Vec<Uuid> =
            serde_json::from_str(&row.part_uuids).map_err(|e| corrupt("part_uuids", e))?;

        Ok(Self {
            order_uuid: parse_id(&row.order_uuid, "order_uuid")?,
            user_uuid: parse_id(&row.user_uuid, "user_uuid")?,
            part_uuids,
            total_price: row.total_price,
            transaction_uuid: row
                .transaction_uuid
                .as_deref()
                .map(|v| parse_id(v, "transaction_uuid"))
                .transpose()?,
            payment_method: row
                .payment_method
                .as_deref()
                .map(str::parse::<PaymentMethod>)
                .transpose()
                .map_err(|e| corrupt("payment_method", e))?,
            status: row
                .status
                .parse::<OrderStatus>()
                .map_err(|e| corrupt("status", e))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
