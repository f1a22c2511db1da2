//! Repository contracts and the composite session repository.
//!
//! Users and sessions have separate, narrow contracts. [`SessionStore`]
//! layers the session cache over the durable session repository:
//! - writes go to the primary first, then the cache (best effort)
//! - [`SessionStore::get`] reads the primary only
//! - [`SessionStore::get_read_through`] is the opt-in hot path that
//!   consults the cache and fills it from the primary on a miss
//! - deletes evict from both

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use rocket_core::db::DatabaseError;

use crate::cache::CacheManager;
use crate::model::{Session, User};
use crate::storage::IamDatabase;

#[tonic::async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a user and its notification methods atomically.
    async fn create_user(&self, user: &User) -> Result<(), DatabaseError>;
    async fn get_user(&self, user_uuid: Uuid) -> Result<Option<User>, DatabaseError>;
    async fn get_user_by_login(&self, login: &str) -> Result<Option<User>, DatabaseError>;
}

#[tonic::async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create_session(&self, session: &Session) -> Result<(), DatabaseError>;
    async fn get_session(&self, session_uuid: Uuid) -> Result<Option<Session>, DatabaseError>;
    async fn delete_session(&self, session_uuid: Uuid) -> Result<bool, DatabaseError>;
    async fn list_active_sessions(&self, now: i64) -> Result<Vec<Session>, DatabaseError>;
}

#[tonic::async_trait]
impl UserRepository for IamDatabase {
    async fn create_user(&self, user: &User) -> Result<(), DatabaseError> {
        self.insert_user(user).await
    }

    async fn get_user(&self, user_uuid: Uuid) -> Result<Option<User>, DatabaseError> {
        self.fetch_user(user_uuid).await
    }

    async fn get_user_by_login(&self, login: &str) -> Result<Option<User>, DatabaseError> {
        self.fetch_user_by_login(login).await
    }
}

#[tonic::async_trait]
impl SessionRepository for IamDatabase {
    async fn create_session(&self, session: &Session) -> Result<(), DatabaseError> {
        self.insert_session(session).await
    }

    async fn get_session(&self, session_uuid: Uuid) -> Result<Option<Session>, DatabaseError> {
        self.fetch_session(session_uuid).await
    }

    async fn delete_session(&self, session_uuid: Uuid) -> Result<bool, DatabaseError> {
        self.remove_session(session_uuid).await
    }

    async fn list_active_sessions(&self, now: i64) -> Result<Vec<Session>, DatabaseError> {
        self.fetch_active_sessions(now).await
    }
}

/// Composite session repository (durable primary + cache).
#[derive(Clone)]
pub struct SessionStore {
    primary: Arc<dyn SessionRepository>,
    cache: CacheManager,
}

impl SessionStore {
    pub fn new(primary: Arc<dyn SessionRepository>, cache: CacheManager) -> Self {
        Self { primary, cache }
    }

    pub const fn cache(&self) -> &CacheManager {
        &self.cache
    }

    pub async fn create(&self, session: &Session, now: i64) -> Result<(), DatabaseError> {
        self.primary.create_session(session).await?;
        if let Err(e) = self.cache.set_session(session, now).await {
            warn!(session_uuid = %session.session_uuid, error = %e, "Session cache write failed");
        }
        Ok(())
    }

    /// Primary-only read.
    pub async fn get(&self, session_uuid: Uuid) -> Result<Option<Session>, DatabaseError> {
        self.primary.get_session(session_uuid).await
    }

    /// Cache first; on a miss load from the primary and populate the cache.
    pub async fn get_read_through(
        &self,
        session_uuid: Uuid,
        now: i64,
    ) -> Result<Option<Session>, DatabaseError> {
        if let Some(session) = self.cache.get(session_uuid).await {
            return Ok(Some(session));
        }
        let session = self.primary.get_session(session_uuid).await?;
        if let Some(session) = &session {
            if !session.is_expired(now) {
                if let Err(e) = self.cache.set_session(session, now).await {
                    warn!(session_uuid = %session_uuid, error = %e, "Session cache fill failed");
                }
            }
        }
        Ok(session)
    }

    /// Delete from the primary, then evict from the cache (best effort).
    pub async fn delete(&self, session_uuid: Uuid) -> Result<bool, DatabaseError> {
        let removed = self.primary.delete_session(session_uuid).await?;
        if let Err(e) = self.cache.delete(session_uuid).await {
            warn!(session_uuid = %session_uuid, error = %e, "Session cache delete failed");
        }
        Ok(removed)
    }

    pub async fn list_active(&self, now: i64) -> Result<Vec<Session>, DatabaseError> {
        self.primary.list_active_sessions(now).await
    }
}
