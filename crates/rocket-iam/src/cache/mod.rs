//! Session cache and its statistics-keeping manager.

pub mod manager;
pub mod session_cache;

pub use manager::{CacheManager, CacheStats, WarmupReport};
pub use session_cache::MokaSessionCache;

use std::time::Duration;

use uuid::Uuid;

use crate::model::Session;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    #[error("ttl must be positive")]
    InvalidTtl,
}

/// Secondary, non-authoritative session store.
#[tonic::async_trait]
pub trait SessionCache: Send + Sync {
    async fn get(&self, session_uuid: Uuid) -> Result<Option<Session>, CacheError>;
    async fn set(&self, session: &Session, ttl: Duration) -> Result<(), CacheError>;
    async fn delete(&self, session_uuid: Uuid) -> Result<(), CacheError>;
}
