//! Cache manager: wraps a [`SessionCache`], keeps statistics, and turns cache
//! failures on read into plain misses.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use rocket_core::db::unix_timestamp;

use crate::model::Session;

use super::{CacheError, SessionCache};

/// Snapshot of cache statistics.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub errors: u64,
    pub sets: u64,
    pub deletes: u64,
    /// Unix seconds of the last hit / miss.
    pub last_hit: Option<i64>,
    pub last_miss: Option<i64>,
}

impl CacheStats {
    /// `hits / (hits + misses)`, or 0 before the first lookup.
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Outcome of [`CacheManager::warmup`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WarmupReport {
    pub loaded: usize,
    pub skipped_expired: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct CacheManager {
    cache: Arc<dyn SessionCache>,
    stats: Arc<RwLock<CacheStats>>,
}

impl CacheManager {
    pub fn new(cache: Arc<dyn SessionCache>) -> Self {
        Self {
            cache,
            stats: Arc::new(RwLock::new(CacheStats::default())),
        }
    }

    /// Look up a session. Errors count as misses and are only logged.
    pub async fn get(&self, session_uuid: Uuid) -> Option<Session> {
        let result = self.cache.get(session_uuid).await;
        let now = unix_timestamp();
        let mut stats = self.stats.write().await;
        match result {
            Ok(Some(session)) => {
                stats.hits += 1;
                stats.last_hit = Some(now);
                Some(session)
            }
            Ok(None) => {
                stats.misses += 1;
                stats.last_miss = Some(now);
                None
            }
            Err(e) => {
                stats.errors += 1;
                stats.misses += 1;
                stats.last_miss = Some(now);
                warn!(session_uuid = %session_uuid, error = %e, "Session cache read failed");
                None
            }
        }
    }

    pub async fn set(&self, session: &Session, ttl: Duration) -> Result<(), CacheError> {
        let result = self.cache.set(session, ttl).await;
        let mut stats = self.stats.write().await;
        match &result {
            Ok(()) => stats.sets += 1,
            Err(_) => stats.errors += 1,
        }
        result
    }

    /// Cache a session for the rest of its lifetime.
    pub async fn set_session(&self, session: &Session, now: i64) -> Result<(), CacheError> {
        let remaining = session.remaining_secs(now);
        if remaining == 0 {
            return Err(CacheError::InvalidTtl);
        }
        #[allow(clippy::cast_sign_loss)]
        let ttl = Duration::from_secs(remaining as u64);
        self.set(session, ttl).await
    }

    pub async fn delete(&self, session_uuid: Uuid) -> Result<(), CacheError> {
        let result = self.cache.delete(session_uuid).await;
        let mut stats = self.stats.write().await;
        match &result {
            Ok(()) => stats.deletes += 1,
            Err(_) => stats.errors += 1,
        }
        result
    }

    /// Load sessions into the cache with `ttl = expires_at - now`.
    ///
    /// Expired sessions are skipped. Failures are counted and reported at
    /// the end; they never stop the loop.
    pub async fn warmup(&self, sessions: &[Session], now: i64) -> WarmupReport {
        let mut report = WarmupReport::default();
        for session in sessions {
            if session.remaining_secs(now) == 0 {
                report.skipped_expired += 1;
                continue;
            }
            match self.set_session(session, now).await {
                Ok(()) => report.loaded += 1,
                Err(e) => {
                    debug!(session_uuid = %session.session_uuid, error = %e, "Warmup set failed");
                    report.failed += 1;
                }
            }
        }

        if report.failed > 0 {
            warn!(
                loaded = report.loaded,
                failed = report.failed,
                "Session cache warmup finished with failures"
            );
        } else {
            info!(
                loaded = report.loaded,
                skipped = report.skipped_expired,
                "Session cache warmup finished"
            );
        }
        report
    }

    pub async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }
}
