//! `ShipAssembled` consumer handler.

use std::sync::Arc;

use tracing::{error, warn};

use rocket_core::ErrorCode;
use rocket_core::bus::{HandlerError, MessageHandler, MessageMeta};
use rocket_core::events::{DomainEvent, ShipAssembledEvent};

use crate::service::OrderService;

/// Moves paid orders to `ASSEMBLED`.
///
/// Payloads that cannot be decoded and events for orders that were never
/// paid are logged and committed, since redelivery cannot fix them. Any
/// other failure, including an unknown order, is returned so the message
/// is redelivered.
pub struct ShipAssembledHandler {
    orders: Arc<OrderService>,
}

impl ShipAssembledHandler {
    pub const fn new(orders: Arc<OrderService>) -> Self {
        Self { orders }
    }
}

#[tonic::async_trait]
impl MessageHandler for ShipAssembledHandler {
    async fn handle(&self, meta: &MessageMeta, payload: &[u8]) -> Result<(), HandlerError> {
        let event = match ShipAssembledEvent::decode(payload) {
            Ok(event) => event,
            Err(e) => {
                error!(
                    topic = %meta.topic,
                    partition = meta.partition,
                    offset = meta.offset,
                    error = %e,
                    "Skipping undecodable ShipAssembled message"
                );
                return Ok(());
            }
        };

        match self.orders.on_ship_assembled(&event).await {
            Ok(()) => Ok(()),
            Err(e) if e.code == ErrorCode::OrderInvalidTransition => {
                error!(
                    order_uuid = %event.order_uuid,
                    partition = meta.partition,
                    offset = meta.offset,
                    error = %e,
                    "Skipping ShipAssembled for an order that is not paid"
                );
                Ok(())
            }
            Err(e) => {
                warn!(
                    order_uuid = %event.order_uuid,
                    partition = meta.partition,
                    offset = meta.offset,
                    error = %e,
                    "ShipAssembled handling failed"
                );
                Err(e.into())
            }
        }
    }
}
