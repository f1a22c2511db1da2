//! Consumer-group reader on top of [`EventLog`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::{BusError, EventLog, MessageHandler, MessageMeta, backoff};

/// Consumer-group membership and tuning.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub group_id: String,
    pub topic: String,
    pub partitions: u32,
    /// This member's slot in the group, `0..member_count`.
    pub member_index: u32,
    pub member_count: u32,
    pub poll_interval: Duration,
    pub batch_size: u32,
    /// Upper bound for the redelivery delay after handler failures.
    pub max_backoff: Duration,
}

impl ConsumerConfig {
    /// Single-member group with default tuning.
    pub fn new(group_id: impl Into<String>, topic: impl Into<String>, partitions: u32) -> Self {
        Self {
            group_id: group_id.into(),
            topic: topic.into(),
            partitions,
            member_index: 0,
            member_count: 1,
            poll_interval: Duration::from_millis(200),
            batch_size: 32,
            max_backoff: Duration::from_secs(10),
        }
    }

    /// Partitions owned by this member (round-robin over the group).
    pub fn assigned_partitions(&self) -> Vec<u32> {
        (0..self.partitions)
            .filter(|p| p % self.member_count.max(1) == self.member_index)
            .collect()
    }
}

/// Result of one polling pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollStats {
    /// Messages handled and committed.
    pub delivered: usize,
    /// Partitions where a handler failed; their offsets stay put.
    pub failed: usize,
}

/// Reads assigned partitions of a topic and feeds them to a handler.
///
/// Delivery is at-least-once: the offset is committed only after the
/// handler returns `Ok`. A failing message blocks the rest of its
/// partition and is redelivered on a later pass, which keeps per-key
/// ordering intact.
pub struct GroupConsumer {
    log: EventLog,
    config: ConsumerConfig,
    handler: Arc<dyn MessageHandler>,
}

impl GroupConsumer {
    pub fn new(
        log: EventLog,
        config: ConsumerConfig,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<Self, BusError> {
        if config.partitions == 0 || config.member_count == 0 {
            return Err(BusError::Config(
                "partitions and member_count must be at least 1".into(),
            ));
        }
        if config.member_index >= config.member_count {
            return Err(BusError::Config(format!(
                "member_index {} out of range for {} members",
                config.member_index, config.member_count
            )));
        }
        Ok(Self {
            log,
            config,
            handler,
        })
    }

    pub const fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    /// Process at most one batch from every assigned partition.
    pub async fn poll_once(&self) -> Result<PollStats, BusError> {
        let mut stats = PollStats::default();
        let ConsumerConfig {
            group_id, topic, ..
        } = &self.config;

        for partition in self.config.assigned_partitions() {
            let start = self
                .log
                .committed_offset(group_id, topic, partition)
                .await?
                .unwrap_or(0);
            let batch = self
                .log
                .fetch(topic, partition, start, self.config.batch_size)
                .await?;

            for message in batch {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let meta = MessageMeta {
                    topic: message.topic,
                    partition: message.partition_id as u32,
                    offset: message.msg_offset,
                    key: message.msg_key,
                };

                match self.handler.handle(&meta, &message.payload).await {
                    Ok(()) => {
                        self.log
                            .commit(group_id, topic, partition, meta.offset + 1)
                            .await?;
                        stats.delivered += 1;
                        debug!(group = %group_id, topic = %topic, partition, offset = meta.offset, "Message committed");
                    }
                    Err(e) => {
                        warn!(
                            group = %group_id,
                            topic = %topic,
                            partition,
                            offset = meta.offset,
                            error = %e,
                            "Handler failed, message will be redelivered"
                        );
                        stats.failed += 1;
                        break;
                    }
                }
            }
        }

        Ok(stats)
    }

    /// Poll until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let ConsumerConfig {
            group_id,
            topic,
            poll_interval,
            max_backoff,
            ..
        } = self.config.clone();
        info!(
            group = %group_id,
            topic = %topic,
            partitions = ?self.config.assigned_partitions(),
            "Consumer started"
        );

        let mut failures: u32 = 0;
        loop {
            if *shutdown.borrow() {
                break;
            }

            let delay = match self.poll_once().await {
                Ok(stats) if stats.failed > 0 => {
                    failures = failures.saturating_add(1);
                    backoff(poll_interval, failures, max_backoff)
                }
                Ok(stats) if stats.delivered > 0 => {
                    failures = 0;
                    continue;
                }
                Ok(_) => {
                    failures = 0;
                    poll_interval
                }
                Err(e) => {
                    failures = failures.saturating_add(1);
                    error!(group = %group_id, topic = %topic, error = %e, "Consumer poll failed");
                    backoff(poll_interval, failures, max_backoff)
                }
            };

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                () = tokio::time::sleep(delay) => {}
            }
        }

        info!(group = %group_id, topic = %topic, "Consumer stopped");
    }
}
