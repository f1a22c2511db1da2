//! Durable message bus.
//!
//! A partitioned append-only log stored in a shared SQLite database:
//! - [`LogProducer`] appends keyed records with at-least-once semantics
//! - [`GroupConsumer`] reads assigned partitions for a consumer group and
//!   commits offsets only after the handler succeeds
//!
//! Records with the same key always land on the same partition, which gives
//! per-key ordering.

mod consumer;
mod log;
mod producer;

pub use consumer::{ConsumerConfig, GroupConsumer, PollStats};
pub use log::{EventLog, StoredMessage};
pub use producer::{LogProducer, ProducerConfig};

use std::time::Duration;

use crate::db::DatabaseError;

/// Position and routing information of a delivered message.
///
/// Handlers can use `(topic, partition, offset)` as an idempotency key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageMeta {
    pub topic: String,
    pub partition: u32,
    pub offset: i64,
    pub key: String,
}

/// Messaging errors.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),

    #[error("Publish to {topic} failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        topic: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Error type returned by message handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Publishes keyed records to a topic.
#[tonic::async_trait]
pub trait Producer: Send + Sync {
    /// Append a record; returns once the write is durable or has failed terminally.
    async fn publish(&self, topic: &str, key: &str, payload: &[u8])
    -> Result<MessageMeta, BusError>;
}

/// Processes one delivered message.
#[tonic::async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, meta: &MessageMeta, payload: &[u8]) -> Result<(), HandlerError>;
}

/// Route a key to a partition (FNV-1a, stable across processes and builds).
pub fn partition_for(key: &str, partitions: u32) -> u32 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;

    let hash = key.bytes().fold(OFFSET_BASIS, |acc, b| {
        (acc ^ u64::from(b)).wrapping_mul(PRIME)
    });
    #[allow(clippy::cast_possible_truncation)]
    let partition = (hash % u64::from(partitions.max(1))) as u32;
    partition
}

/// Exponential backoff: `base * 2^attempt`, capped at `max`.
pub(crate) fn backoff(base: Duration, attempt: u32, max: Duration) -> Duration {
    let factor = 2u32.saturating_pow(attempt.min(16));
    base.saturating_mul(factor).min(max)
}
