//! Keyed, retrying producer on top of [`EventLog`].

use std::time::Duration;

use tracing::{debug, warn};

use crate::db::DatabaseError;

use super::{BusError, EventLog, MessageMeta, Producer, backoff, partition_for};

/// Producer tuning.
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    pub partitions: u32,
    /// Retries after the first attempt for transient failures.
    pub max_retries: u32,
    pub retry_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            partitions: 3,
            max_retries: 3,
            retry_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
        }
    }
}

/// Appends records to the shared event log.
///
/// A record is acknowledged only after its insert committed, so a
/// successful `publish` is durable. Transient storage failures (busy or
/// locked database, I/O) are retried with exponential backoff.
#[derive(Clone)]
pub struct LogProducer {
    log: EventLog,
    config: ProducerConfig,
}

impl LogProducer {
    pub fn new(log: EventLog, config: ProducerConfig) -> Result<Self, BusError> {
        if config.partitions == 0 {
            return Err(BusError::Config("partitions must be at least 1".into()));
        }
        Ok(Self { log, config })
    }

    pub const fn log(&self) -> &EventLog {
        &self.log
    }

    pub const fn partitions(&self) -> u32 {
        self.config.partitions
    }
}

/// A conflict means another appender claimed the same offset first.
const fn is_retryable(e: &DatabaseError) -> bool {
    e.is_transient() || matches!(e, DatabaseError::Conflict(_))
}

#[tonic::async_trait]
impl Producer for LogProducer {
    async fn publish(
        &self,
        topic: &str,
        key: &str,
        payload: &[u8],
    ) -> Result<MessageMeta, BusError> {
        let partition = partition_for(key, self.config.partitions);
        let mut attempt = 0;

        loop {
            match self.log.append(topic, partition, key, payload).await {
                Ok(offset) => {
                    debug!(topic, partition, offset, key, "Message published");
                    return Ok(MessageMeta {
                        topic: topic.to_string(),
                        partition,
                        offset,
                        key: key.to_string(),
                    });
                }
                Err(e) if is_retryable(&e) && attempt < self.config.max_retries => {
                    let delay = backoff(
                        self.config.retry_backoff,
                        attempt,
                        self.config.max_backoff,
                    );
                    warn!(topic, attempt, error = %e, ?delay, "Publish failed, retrying");
                    attempt += 1;
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    return Err(BusError::RetriesExhausted {
                        topic: topic.to_string(),
                        attempts: attempt + 1,
                        last_error: e.to_string(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_key_keeps_order_on_one_partition() {
        let log = EventLog::open_in_memory().await.unwrap();
        let producer = LogProducer::new(log.clone(), ProducerConfig::default()).unwrap();

        let first = producer.publish("order.paid", "order-1", b"one").await.unwrap();
        let second = producer.publish("order.paid", "order-1", b"two").await.unwrap();

        assert_eq!(first.partition, second.partition);
        assert_eq!(second.offset, first.offset + 1);

        let stored = log.fetch("order.paid", first.partition, 0, 10).await.unwrap();
        let payloads: Vec<_> = stored.iter().map(|m| m.payload.clone()).collect();
        assert_eq!(payloads, vec![b"one".to_vec(), b"two".to_vec()]);
    }

    #[tokio::test]
    async fn zero_partitions_is_rejected() {
        let log = EventLog::open_in_memory().await.unwrap();
        let config = ProducerConfig {
            partitions: 0,
            ..ProducerConfig::default()
        };
        assert!(matches!(
            LogProducer::new(log, config),
            Err(BusError::Config(_))
        ));
    }

    #[tokio::test]
    async fn closed_log_fails_after_retries() {
        let log = EventLog::open_in_memory().await.unwrap();
        let producer = LogProducer::new(
            log.clone(),
            ProducerConfig {
                max_retries: 2,
                retry_backoff: Duration::from_millis(1),
                ..ProducerConfig::default()
            },
        )
        .unwrap();
        log.close().await;

        let err = producer.publish("t", "k", b"x").await.unwrap_err();
        assert!(matches!(err, BusError::RetriesExhausted { attempts: 3, .. }));
    }
}
