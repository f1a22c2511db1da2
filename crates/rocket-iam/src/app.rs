//! Composition root: builds the IAM object graph leaves first.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use rocket_core::db::{DatabaseError, unix_timestamp};

use crate::auth::{HashParams, JwtManager, TokenBlacklist};
use crate::cache::{CacheManager, MokaSessionCache, WarmupReport};
use crate::config::{CacheArgs, JwtArgs};
use crate::repository::SessionStore;
use crate::server::{AuthServiceImpl, JwtServiceImpl, UserServiceImpl};
use crate::service::{SessionService, TokenService, UserService};
use crate::storage::IamDatabase;

/// Everything needed to wire the IAM services.
#[derive(Clone)]
pub struct IamSettings {
    pub session_ttl: Duration,
    pub cache_max_capacity: u64,
    pub access_secret: Vec<u8>,
    pub refresh_secret: Vec<u8>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub hash_params: HashParams,
}

impl IamSettings {
    pub fn from_args(cache: &CacheArgs, jwt: &JwtArgs) -> Self {
        Self {
            session_ttl: cache.session_ttl,
            cache_max_capacity: cache.max_capacity,
            access_secret: jwt.access_secret.as_bytes().to_vec(),
            refresh_secret: jwt.refresh_secret.as_bytes().to_vec(),
            access_ttl: jwt.access_ttl,
            refresh_ttl: jwt.refresh_ttl,
            hash_params: HashParams::default(),
        }
    }
}

/// The wired IAM subsystem.
pub struct Iam {
    db: IamDatabase,
    users: Arc<UserService>,
    sessions: Arc<SessionService>,
    tokens: Arc<TokenService>,
}

impl Iam {
    pub fn build(db: IamDatabase, settings: &IamSettings) -> Self {
        let users = Arc::new(UserService::new(
            Arc::new(db.clone()),
            settings.hash_params,
        ));

        let cache = CacheManager::new(Arc::new(MokaSessionCache::new(
            settings.cache_max_capacity,
        )));
        let store = SessionStore::new(Arc::new(db.clone()), cache);
        let sessions = Arc::new(SessionService::new(
            Arc::clone(&users),
            store,
            settings.session_ttl,
        ));

        let jwt = Arc::new(JwtManager::new(
            &settings.access_secret,
            &settings.refresh_secret,
            settings.access_ttl,
            settings.refresh_ttl,
        ));
        let blacklist = TokenBlacklist::new(settings.refresh_ttl);
        let tokens = Arc::new(TokenService::new(Arc::clone(&users), jwt, blacklist));

        Self {
            db,
            users,
            sessions,
            tokens,
        }
    }

    pub const fn database(&self) -> &IamDatabase {
        &self.db
    }

    pub fn sessions(&self) -> Arc<SessionService> {
        Arc::clone(&self.sessions)
    }

    pub fn tokens(&self) -> Arc<TokenService> {
        Arc::clone(&self.tokens)
    }

    pub fn auth_service(&self) -> AuthServiceImpl {
        AuthServiceImpl::new(Arc::clone(&self.sessions))
    }

    pub fn user_service(&self) -> UserServiceImpl {
        UserServiceImpl::new(Arc::clone(&self.users))
    }

    pub fn jwt_service(&self) -> JwtServiceImpl {
        JwtServiceImpl::new(Arc::clone(&self.tokens))
    }

    /// Load active sessions from the primary store into the cache.
    pub async fn warmup_cache(&self) -> Result<WarmupReport, DatabaseError> {
        let now = unix_timestamp();
        let store = self.sessions.store();
        let active = store.list_active(now).await?;
        let report = store.cache().warmup(&active, now).await;
        info!(
            loaded = report.loaded,
            skipped_expired = report.skipped_expired,
            failed = report.failed,
            "Session cache warmup complete"
        );
        Ok(report)
    }

    /// Periodically delete expired sessions from the primary store.
    pub fn spawn_session_purge(
        &self,
        every: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let db = self.db.clone();
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
                match db.purge_expired_sessions(unix_timestamp()).await {
                    Ok(removed) if removed > 0 => {
                        info!(removed, "Expired sessions purged");
                    }
                    Err(e) => {
                        warn!(error = %e, "Session purge failed");
                    }
                    _ => {}
                }
            }
        })
    }
}
