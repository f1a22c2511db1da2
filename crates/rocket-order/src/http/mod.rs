//! HTTP/JSON API for orders.
//!
//! Every `/api/v1/orders` route sits behind the session guard; `/health`
//! does not.

mod error;
mod handlers;
mod session;


pub use error::ApiError;
pub use handlers::{CreateOrderRequest, CreateOrderResponse, PayOrderRequest, PayOrderResponse};
pub use session::{CurrentSession, SESSION_HEADER};

use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::routing::{get, post};
use axum::{Router, middleware};
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;
use tower_http::timeout::RequestBodyTimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::clients::IamClient;
use crate::service::OrderService;

#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<OrderService>,
    pub iam: Arc<dyn IamClient>,
}

/// Deadlines applied to every request.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    /// Upper bound for receiving the request body.
    pub read: Duration,
    /// Upper bound for the whole request.
    pub request: Duration,
}

pub fn router(state: AppState, timeouts: Timeouts) -> Router {
    let orders = Router::new()
        .route("/api/v1/orders", post(handlers::create_order))
        .route("/api/v1/orders/{order_uuid}", get(handlers::get_order))
        .route("/api/v1/orders/{order_uuid}/pay", post(handlers::pay_order))
        .route(
            "/api/v1/orders/{order_uuid}/cancel",
            post(handlers::cancel_order),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_session,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(orders)
        .fallback(handlers::not_found)
        .layer(RequestBodyTimeoutLayer::new(timeouts.read))
        .layer(TraceLayer::new_for_http())
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .layer(TimeoutLayer::new(timeouts.request)),
        )
        .with_state(state)
}

async fn handle_timeout_error(err: tower::BoxError) -> ApiError {
    warn!(error = %err, "Request timed out");
    ApiError::Timeout
}
