//! Opaque session login, whoami and logout.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};
use uuid::Uuid;

use rocket_core::db::unix_timestamp;
use rocket_core::{ErrorCode, Result};

use crate::model::{Session, User};
use crate::repository::SessionStore;

use super::{UserService, database_error};

pub struct SessionService {
    users: Arc<UserService>,
    store: SessionStore,
    session_ttl: Duration,
}

impl SessionService {
    pub fn new(users: Arc<UserService>, store: SessionStore, session_ttl: Duration) -> Self {
        Self {
            users,
            store,
            session_ttl,
        }
    }

    pub const fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Verify credentials and open a new session.
    pub async fn login(&self, login: &str, password: &str) -> Result<Session> {
        let user = self.users.verify_credentials(login, password).await?;

        let now = unix_timestamp();
        #[allow(clippy::cast_possible_wrap)]
        let session = Session::new(user.user_uuid, now, self.session_ttl.as_secs() as i64);
        self.store
            .create(&session, now)
            .await
            .map_err(database_error)?;

        info!(
            user_uuid = %user.user_uuid,
            session_uuid = %session.session_uuid,
            "Session created"
        );
        Ok(session)
    }

    /// Resolve a session to its user.
    pub async fn whoami(&self, session_uuid: Uuid) -> Result<(Session, User)> {
        let now = unix_timestamp();
        let session = self
            .store
            .get_read_through(session_uuid, now)
            .await
            .map_err(database_error)?
            .ok_or(ErrorCode::SessionNotFound)?;

        if session.is_expired(now) {
            return Err(ErrorCode::SessionExpired.into());
        }

        let user = self.users.get_user(session.user_uuid).await?;
        Ok((session, user))
    }

    /// Delete a session. Deleting an unknown session succeeds.
    pub async fn logout(&self, session_uuid: Uuid) -> Result<()> {
        let removed = self
            .store
            .delete(session_uuid)
            .await
            .map_err(database_error)?;
        debug!(session_uuid = %session_uuid, removed, "Session logout");
        Ok(())
    }
}
