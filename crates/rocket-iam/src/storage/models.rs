//! Row types for IAM storage.

use uuid::Uuid;

use crate::model::{NotificationMethod, Session, User};

use super::DatabaseError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub user_uuid: String,
    pub login: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NotificationMethodRow {
    pub provider_name: String,
    pub target: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRow {
    pub session_uuid: String,
    pub user_uuid: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub expires_at: i64,
}

pub fn parse_stored_uuid(value: &str, column: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(value)
        .map_err(|e| DatabaseError::Query(format!("corrupt {column} `{value}`: {e}")))
}

impl UserRow {
    pub fn into_user(self, methods: Vec<NotificationMethodRow>) -> Result<User, DatabaseError> {
        Ok(User {
            user_uuid: parse_stored_uuid(&self.user_uuid, "user_uuid")?,
            login: self.login,
            email: self.email,
            password_hash: self.password_hash,
            notification_methods: methods
                .into_iter()
                .map(|m| NotificationMethod {
                    provider_name: m.provider_name,
                    target: m.target,
                })
                .collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl TryFrom<SessionRow> for Session {
    type Error = DatabaseError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            session_uuid: parse_stored_uuid(&row.session_uuid, "session_uuid")?,
            user_uuid: parse_stored_uuid(&row.user_uuid, "user_uuid")?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            expires_at: row.expires_at,
        })
    }
}
