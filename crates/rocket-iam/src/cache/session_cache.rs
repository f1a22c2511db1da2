//! In-process session cache backed by `moka`.

use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache;
use uuid::Uuid;

use crate::model::Session;

use super::{CacheError, SessionCache};

#[derive(Clone)]
struct Entry {
    session: Session,
    ttl: Duration,
}

/// Each entry lives exactly as long as the ttl it was set with.
struct EntryTtl;

impl Expiry<Uuid, Entry> for EntryTtl {
    fn expire_after_create(&self, _key: &Uuid, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &Uuid,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

#[derive(Clone)]
pub struct MokaSessionCache {
    cache: Cache<Uuid, Entry>,
}

impl MokaSessionCache {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(max_capacity)
                .expire_after(EntryTtl)
                .build(),
        }
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[tonic::async_trait]
impl SessionCache for MokaSessionCache {
    async fn get(&self, session_uuid: Uuid) -> Result<Option<Session>, CacheError> {
        Ok(self.cache.get(&session_uuid).await.map(|e| e.session))
    }

    async fn set(&self, session: &Session, ttl: Duration) -> Result<(), CacheError> {
        if ttl.is_zero() {
            return Err(CacheError::InvalidTtl);
        }
        self.cache
            .insert(
                session.session_uuid,
                Entry {
                    session: session.clone(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn delete(&self, session_uuid: Uuid) -> Result<(), CacheError> {
        self.cache.invalidate(&session_uuid).await;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(Uuid::new_v4(), 1_000, 3600)
    }

    #[tokio::test]
    async fn set_then_get_within_ttl() {
        let cache = MokaSessionCache::new(100);
        let s = session();
        cache.set(&s, Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get(s.session_uuid).await.unwrap(), Some(s));
    }

    #[tokio::test]
    async fn entry_disappears_after_ttl() {
        let cache = MokaSessionCache::new(100);
        let s = session();
        cache.set(&s, Duration::from_millis(50)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(cache.get(s.session_uuid).await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_evicts() {
        let cache = MokaSessionCache::new(100);
        let s = session();
        cache.set(&s, Duration::from_secs(60)).await.unwrap();
        cache.delete(s.session_uuid).await.unwrap();
        assert_eq!(cache.get(s.session_uuid).await.unwrap(), None);
    }

    #[tokio::test]
    async fn zero_ttl_is_rejected() {
        let cache = MokaSessionCache::new(100);
        assert!(matches!(
            cache.set(&session(), Duration::ZERO).await,
            Err(CacheError::InvalidTtl)
        ));
    }
}
