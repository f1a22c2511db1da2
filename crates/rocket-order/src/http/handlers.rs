//! Order API handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use rocket_core::convert::parse_uuid;
use rocket_core::{ErrorCode, ServiceError};

use super::AppState;
use super::error::ApiError;
use super::session::CurrentSession;
use crate::model::{Order, OrderDraft, PaymentMethod};

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Defaults to the session's user.
    #[serde(default)]
    pub user_uuid: Option<String>,
    #[serde(default)]
    pub part_uuids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub order_uuid: Uuid,
    pub total_price: f64,
}

#[derive(Debug, Deserialize)]
pub struct PayOrderRequest {
    #[serde(default)]
    pub payment_method: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PayOrderResponse {
    pub transaction_uuid: Uuid,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "order" }))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

pub async fn create_order(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), ApiError> {
    let Json(body) = payload?;

    let user_uuid = match body.user_uuid.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => parse_uuid(raw, "user_uuid")?,
        _ => session.0.user_uuid,
    };
    let part_uuids = body
        .part_uuids
        .iter()
        .map(|id| parse_uuid(id, "part_uuids"))
        .collect::<Result<Vec<_>, _>>()?;

    let order = state
        .orders
        .create_order(OrderDraft {
            user_uuid,
            part_uuids,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            order_uuid: order.order_uuid,
            total_price: order.total_price,
        }),
    ))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(order_uuid): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let order_uuid = parse_uuid(&order_uuid, "order_uuid")?;
    Ok(Json(state.orders.get_order(order_uuid).await?))
}

pub async fn pay_order(
    State(state): State<AppState>,
    Path(order_uuid): Path<String>,
    payload: Result<Json<PayOrderRequest>, JsonRejection>,
) -> Result<Json<PayOrderResponse>, ApiError> {
    let order_uuid = parse_uuid(&order_uuid, "order_uuid")?;
    let Json(body) = payload?;
    let method = body.payment_method.parse::<PaymentMethod>().map_err(|_| {
        ServiceError::new(
            ErrorCode::InvalidArgument,
            "payment_method must be one of CARD, SBP, CREDIT_CARD, INVESTOR_MONEY",
        )
    })?;

    let transaction_uuid = state.orders.pay_order(order_uuid, method).await?;
    Ok(Json(PayOrderResponse { transaction_uuid }))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    Path(order_uuid): Path<String>,
) -> Result<StatusCode, ApiError> {
    let order_uuid = parse_uuid(&order_uuid, "order_uuid")?;
    state.orders.cancel_order(order_uuid).await?;
    Ok(StatusCode::NO_CONTENT)
}
