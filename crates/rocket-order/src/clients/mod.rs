//! Outbound service contracts used by the order service.
//!
//! Each collaborator is a narrow trait with a gRPC implementation; tests
//! plug in in-memory fakes.

mod iam;
mod inventory;
mod payment;

pub use iam::GrpcIamClient;
pub use inventory::GrpcInventoryClient;
pub use payment::GrpcPaymentClient;

use std::time::Duration;

use tonic::transport::{Channel, Endpoint};
use uuid::Uuid;

use rocket_core::ServiceError;

use crate::model::PaymentMethod;

/// Outbound call failures.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The remote service answered with a taxonomy error.
    #[error("remote error: {0}")]
    Remote(ServiceError),

    /// The remote service could not be reached or timed out.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<tonic::Status> for ClientError {
    fn from(status: tonic::Status) -> Self {
        match status.code() {
            tonic::Code::Unavailable => Self::Transport(status.message().to_string()),
            _ => Self::Remote(ServiceError::from_status(&status)),
        }
    }
}

/// Price-relevant view of a catalog part.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogPart {
    pub part_uuid: Uuid,
    pub name: String,
    pub price: f64,
}

/// Identity resolved from a session id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub session_uuid: Uuid,
    pub user_uuid: Uuid,
    pub login: String,
}

#[tonic::async_trait]
pub trait InventoryClient: Send + Sync {
    /// Parts whose ids are in `part_uuids`; missing ids are simply absent.
    async fn list_parts(&self, part_uuids: &[Uuid]) -> Result<Vec<CatalogPart>, ClientError>;
}

#[tonic::async_trait]
pub trait PaymentClient: Send + Sync {
    /// Charge an order and return the transaction id.
    async fn pay_order(
        &self,
        order_uuid: Uuid,
        user_uuid: Uuid,
        method: PaymentMethod,
    ) -> Result<Uuid, ClientError>;
}

#[tonic::async_trait]
pub trait IamClient: Send + Sync {
    async fn whoami(&self, session_uuid: &str) -> Result<SessionIdentity, ClientError>;
}

/// A channel that connects on first use, with per-call deadlines.
pub(crate) fn lazy_channel(addr: &str, timeout: Duration) -> Result<Channel, ClientError> {
    let endpoint = Endpoint::from_shared(addr.to_string())
        .map_err(|e| ClientError::Transport(format!("invalid address {addr}: {e}")))?
        .connect_timeout(timeout)
        .timeout(timeout)
        .http2_keep_alive_interval(Duration::from_secs(30))
        .keep_alive_timeout(Duration::from_secs(10));
    Ok(endpoint.connect_lazy())
}

pub(crate) fn response_uuid(value: &str, field: &str) -> Result<Uuid, ClientError> {
    Uuid::parse_str(value)
        .map_err(|_| ClientError::InvalidResponse(format!("{field} is not a valid UUID")))
}
