//! `OrderPaid` handler that assembles ships.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{info, instrument};

use rocket_core::bus::{HandlerError, MessageHandler, MessageMeta, Producer};
use rocket_core::events::{DomainEvent, OrderPaidEvent, ShipAssembledEvent};

pub struct AssemblyHandler {
    producer: Arc<dyn Producer>,
    ship_assembled_topic: String,
    build_secs: RangeInclusive<u64>,
}

impl AssemblyHandler {
    pub fn new(
        producer: Arc<dyn Producer>,
        ship_assembled_topic: impl Into<String>,
        build_secs: RangeInclusive<u64>,
    ) -> Self {
        Self {
            producer,
            ship_assembled_topic: ship_assembled_topic.into(),
            build_secs,
        }
    }

    /// Uniform draw from the configured build time range.
    pub fn pick_build_secs(&self, rng: &mut impl Rng) -> u64 {
        if self.build_secs.is_empty() {
            return *self.build_secs.start();
        }
        rng.random_range(self.build_secs.clone())
    }
}

#[tonic::async_trait]
impl MessageHandler for AssemblyHandler {
    #[instrument(skip_all, fields(partition = meta.partition, offset = meta.offset))]
    async fn handle(&self, meta: &MessageMeta, payload: &[u8]) -> Result<(), HandlerError> {
        let paid = OrderPaidEvent::decode(payload)?;
        let build_secs = self.pick_build_secs(&mut rand::rng());

        info!(order_uuid = %paid.order_uuid, build_secs, "Assembling ship");
        tokio::time::sleep(Duration::from_secs(build_secs)).await;

        let assembled = ShipAssembledEvent::new(
            paid.order_uuid,
            paid.user_uuid,
            i64::try_from(build_secs)?,
        );
        self.producer
            .publish(
                &self.ship_assembled_topic,
                &assembled.partition_key(),
                &assembled.encode(),
            )
            .await?;

        info!(
            order_uuid = %paid.order_uuid,
            event_uuid = %assembled.event_uuid,
            "Ship assembled"
        );
        Ok(())
    }
}
