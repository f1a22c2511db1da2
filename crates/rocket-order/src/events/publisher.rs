//! `OrderPaid` producer with outbox fallback.

use std::sync::Arc;

use tracing::{error, info, warn};

use rocket_core::bus::{MessageMeta, Producer};
use rocket_core::events::{DomainEvent, OrderPaidEvent};

use crate::repository::Outbox;

/// Where an event ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Published(MessageMeta),
    /// Stored in the outbox for the relay to retry.
    Deferred { outbox_id: i64 },
    /// Neither the bus nor the outbox accepted the event.
    Dropped,
}

pub struct OrderEventPublisher {
    producer: Arc<dyn Producer>,
    outbox: Arc<dyn Outbox>,
    order_paid_topic: String,
}

impl OrderEventPublisher {
    pub fn new(
        producer: Arc<dyn Producer>,
        outbox: Arc<dyn Outbox>,
        order_paid_topic: impl Into<String>,
    ) -> Self {
        Self {
            producer,
            outbox,
            order_paid_topic: order_paid_topic.into(),
        }
    }

    /// Publish keyed by order id. Never fails the caller: the order is
    /// already paid when this runs.
    pub async fn order_paid(&self, event: &OrderPaidEvent) -> PublishOutcome {
        let topic = self.order_paid_topic.as_str();
        let key = event.partition_key();
        let payload = event.encode();

        let publish_error = match self.producer.publish(topic, &key, &payload).await {
            Ok(meta) => {
                info!(
                    order_uuid = %event.order_uuid,
                    event_uuid = %event.event_uuid,
                    partition = meta.partition,
                    offset = meta.offset,
                    "OrderPaid published"
                );
                return PublishOutcome::Published(meta);
            }
            Err(e) => e,
        };

        warn!(
            order_uuid = %event.order_uuid,
            error = %publish_error,
            "OrderPaid publish failed, deferring to outbox"
        );
        match self
            .outbox
            .enqueue(topic, &key, &payload, &publish_error.to_string())
            .await
        {
            Ok(outbox_id) => PublishOutcome::Deferred { outbox_id },
            Err(e) => {
                error!(
                    order_uuid = %event.order_uuid,
                    event_uuid = %event.event_uuid,
                    error = %e,
                    publish_error = %publish_error,
                    "OrderPaid event lost, outbox write failed"
                );
                PublishOutcome::Dropped
            }
        }
    }
}
