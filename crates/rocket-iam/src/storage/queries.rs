//! Database queries for the IAM service.

use uuid::Uuid;

use crate::model::{Session, User};

use super::DatabaseError;
use super::db::IamDatabase;
use super::models::{NotificationMethodRow, SessionRow, UserRow};

impl IamDatabase {
    // =========================================================================
    // User queries
    // =========================================================================

    /// Insert a user and its notification methods in one transaction.
    ///
    /// A duplicate login fails with [`DatabaseError::Conflict`] and leaves
    /// nothing behind.
    pub async fn insert_user(&self, user: &User) -> Result<(), DatabaseError> {
        let mut tx = self.pool().begin().await?;

        sqlx::query(
            "INSERT INTO users (user_uuid, login, email, password_hash, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user.user_uuid.to_string())
        .bind(&user.login)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await?;

        for (position, method) in user.notification_methods.iter().enumerate() {
            let position = i64::try_from(position).unwrap_or(i64::MAX);
            sqlx::query(
                "INSERT INTO notification_methods (user_uuid, position, provider_name, target) \
                 VALUES (?, ?, ?, ?)",
            )
            .bind(user.user_uuid.to_string())
            .bind(position)
            .bind(&method.provider_name)
            .bind(&method.target)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Get a user by UUID.
    pub async fn fetch_user(&self, user_uuid: Uuid) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE user_uuid = ?")
            .bind(user_uuid.to_string())
            .fetch_optional(self.pool())
            .await?;
        self.with_methods(row).await
    }

    /// Get a user by login (case sensitive).
    pub async fn fetch_user_by_login(&self, login: &str) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE login = ?")
            .bind(login)
            .fetch_optional(self.pool())
            .await?;
        self.with_methods(row).await
    }

    async fn with_methods(&self, row: Option<UserRow>) -> Result<Option<User>, DatabaseError> {
        let Some(row) = row else {
            return Ok(None);
        };
        let methods = sqlx::query_as::<_, NotificationMethodRow>(
            "SELECT provider_name, target FROM notification_methods \
             WHERE user_uuid = ? ORDER BY position ASC",
        )
        .bind(&row.user_uuid)
        .fetch_all(self.pool())
        .await?;
        row.into_user(methods).map(Some)
    }

    // =========================================================================
    // Session queries
    // =========================================================================

    pub async fn insert_session(&self, session: &Session) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO sessions (session_uuid, user_uuid, created_at, updated_at, expires_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(session.session_uuid.to_string())
        .bind(session.user_uuid.to_string())
        .bind(session.created_at)
        .bind(session.updated_at)
        .bind(session.expires_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    pub async fn fetch_session(&self, session_uuid: Uuid) -> Result<Option<Session>, DatabaseError> {
        sqlx::query_as::<_, SessionRow>("SELECT * FROM sessions WHERE session_uuid = ?")
            .bind(session_uuid.to_string())
            .fetch_optional(self.pool())
            .await?
            .map(Session::try_from)
            .transpose()
    }

    /// Delete a session. Returns `true` if a row was removed.
    pub async fn remove_session(&self, session_uuid: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM sessions WHERE session_uuid = ?")
            .bind(session_uuid.to_string())
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Sessions that have not expired at `now`, soonest expiry last.
    pub async fn fetch_active_sessions(&self, now: i64) -> Result<Vec<Session>, DatabaseError> {
        sqlx::query_as::<_, SessionRow>(
            "SELECT * FROM sessions WHERE expires_at >= ? ORDER BY expires_at DESC",
        )
        .bind(now)
        .fetch_all(self.pool())
        .await?
        .into_iter()
        .map(Session::try_from)
        .collect()
    }

    /// Extend a session. Returns `false` if it no longer exists.
    pub async fn touch_session(
        &self,
        session_uuid: Uuid,
        updated_at: i64,
        expires_at: i64,
    ) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE sessions SET updated_at = ?, expires_at = ? WHERE session_uuid = ?",
        )
        .bind(updated_at)
        .bind(expires_at)
        .bind(session_uuid.to_string())
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete sessions that expired before `now`.
    pub async fn purge_expired_sessions(&self, now: i64) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
            .bind(now)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }
}
