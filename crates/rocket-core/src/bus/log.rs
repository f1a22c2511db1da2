//! SQLite-backed partitioned event log.

use serde::Serialize;

use crate::db::{DatabaseError, unix_timestamp};

crate::define_database!(EventLog, "Event log migrations complete");

/// A record as stored in the log.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StoredMessage {
    pub topic: String,
    pub partition_id: i64,
    pub msg_offset: i64,
    pub msg_key: String,
    pub payload: Vec<u8>,
    pub created_at: i64,
}

impl EventLog {
    /// Append a record to `(topic, partition)` and return its offset.
    ///
    /// Offset assignment and insert happen in one statement, so concurrent
    /// appenders on the same partition never observe the same offset.
    pub async fn append(
        &self,
        topic: &str,
        partition: u32,
        key: &str,
        payload: &[u8],
    ) -> Result<i64, DatabaseError> {
        let (offset,): (i64,) = sqlx::query_as(
            "INSERT INTO bus_messages (topic, partition_id, msg_offset, msg_key, payload, created_at) \
             SELECT ?, ?, COALESCE(MAX(msg_offset) + 1, 0), ?, ?, ? \
             FROM bus_messages WHERE topic = ? AND partition_id = ? \
             RETURNING msg_offset",
        )
        .bind(topic)
        .bind(i64::from(partition))
        .bind(key)
        .bind(payload)
        .bind(unix_timestamp())
        .bind(topic)
        .bind(i64::from(partition))
        .fetch_one(self.pool())
        .await?;

        Ok(offset)
    }

    /// Read up to `limit` records starting at `from_offset`.
    pub async fn fetch(
        &self,
        topic: &str,
        partition: u32,
        from_offset: i64,
        limit: u32,
    ) -> Result<Vec<StoredMessage>, DatabaseError> {
        let messages = sqlx::query_as::<_, StoredMessage>(
            "SELECT * FROM bus_messages WHERE topic = ? AND partition_id = ? AND msg_offset >= ? \
             ORDER BY msg_offset ASC LIMIT ?",
        )
        .bind(topic)
        .bind(i64::from(partition))
        .bind(from_offset)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(messages)
    }

    /// Next offset to consume for a group, if the group has committed before.
    pub async fn committed_offset(
        &self,
        group_id: &str,
        topic: &str,
        partition: u32,
    ) -> Result<Option<i64>, DatabaseError> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT next_offset FROM bus_offsets WHERE group_id = ? AND topic = ? AND partition_id = ?",
        )
        .bind(group_id)
        .bind(topic)
        .bind(i64::from(partition))
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(|r| r.0))
    }

    /// Commit the next offset to consume for a group.
    pub async fn commit(
        &self,
        group_id: &str,
        topic: &str,
        partition: u32,
        next_offset: i64,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO bus_offsets (group_id, topic, partition_id, next_offset, updated_at) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT (group_id, topic, partition_id) \
             DO UPDATE SET next_offset = excluded.next_offset, updated_at = excluded.updated_at",
        )
        .bind(group_id)
        .bind(topic)
        .bind(i64::from(partition))
        .bind(next_offset)
        .bind(unix_timestamp())
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Offset the next appended record on `(topic, partition)` will get.
    pub async fn end_offset(&self, topic: &str, partition: u32) -> Result<i64, DatabaseError> {
        let (end,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(MAX(msg_offset) + 1, 0) FROM bus_messages WHERE topic = ? AND partition_id = ?",
        )
        .bind(topic)
        .bind(i64::from(partition))
        .fetch_one(self.pool())
        .await?;

        Ok(end)
    }

    /// All records of a topic across partitions, in append order per partition.
    pub async fn topic_messages(&self, topic: &str) -> Result<Vec<StoredMessage>, DatabaseError> {
        let messages = sqlx::query_as::<_, StoredMessage>(
            "SELECT * FROM bus_messages WHERE topic = ? ORDER BY partition_id ASC, msg_offset ASC",
        )
        .bind(topic)
        .fetch_all(self.pool())
        .await?;

        Ok(messages)
    }
}
