//! Background redelivery of outbox entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use rocket_core::bus::Producer;
use rocket_core::db::DatabaseError;

use crate::repository::Outbox;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelayStats {
    pub published: usize,
    pub failed: usize,
}

pub struct OutboxRelay {
    outbox: Arc<dyn Outbox>,
    producer: Arc<dyn Producer>,
    batch_size: u32,
}

impl OutboxRelay {
    pub fn new(outbox: Arc<dyn Outbox>, producer: Arc<dyn Producer>, batch_size: u32) -> Self {
        Self {
            outbox,
            producer,
            batch_size: batch_size.max(1),
        }
    }

    /// Publish one batch, oldest first.
    ///
    /// Stops at the first publish failure so later entries never overtake
    /// an earlier one. An entry is removed only after its publish succeeded.
    pub async fn relay_once(&self) -> Result<RelayStats, DatabaseError> {
        let mut stats = RelayStats::default();

        for entry in self.outbox.pending(self.batch_size).await? {
            match self
                .producer
                .publish(&entry.topic, &entry.msg_key, &entry.payload)
                .await
            {
                Ok(meta) => {
                    self.outbox.remove(entry.id).await?;
                    stats.published += 1;
                    info!(
                        outbox_id = entry.id,
                        topic = %entry.topic,
                        key = %entry.msg_key,
                        offset = meta.offset,
                        attempts = entry.attempts + 1,
                        "Outbox entry delivered"
                    );
                }
                Err(e) => {
                    warn!(outbox_id = entry.id, topic = %entry.topic, error = %e, "Outbox redelivery failed");
                    self.outbox.record_failure(entry.id, &e.to_string()).await?;
                    stats.failed += 1;
                    break;
                }
            }
        }

        Ok(stats)
    }

    /// Relay every `every` until `shutdown` fires.
    pub fn spawn(self, every: Duration, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await; // Skip first immediate tick
            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                        continue;
                    }
                }
                if let Err(e) = self.relay_once().await {
                    warn!(error = %e, "Outbox relay pass failed");
                }
            }
        })
    }
}
