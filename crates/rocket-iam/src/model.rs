//! IAM domain types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a user wants to be notified (e.g. `telegram` + chat id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMethod {
    pub provider_name: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_uuid: Uuid,
    pub login: String,
    pub email: String,
    /// PHC string; never leaves the service.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub notification_methods: Vec<NotificationMethod>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Registration input.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub login: String,
    pub email: String,
    pub password: String,
    pub notification_methods: Vec<NotificationMethod>,
}

/// Opaque server-side session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_uuid: Uuid,
    pub user_uuid: Uuid,
    pub created_at: i64,
    pub updated_at: i64,
    pub expires_at: i64,
}

impl Session {
    pub fn new(user_uuid: Uuid, now: i64, ttl_secs: i64) -> Self {
        Self {
            session_uuid: Uuid::new_v4(),
            user_uuid,
            created_at: now,
            updated_at: now,
            expires_at: now + ttl_secs,
        }
    }

    /// Expired iff `now > expires_at`.
    pub const fn is_expired(&self, now: i64) -> bool {
        now > self.expires_at
    }

    /// Seconds left before expiry, zero once expired.
    pub const fn remaining_secs(&self, now: i64) -> i64 {
        let left = self.expires_at - now;
        if left > 0 { left } else { 0 }
    }
}

/// Access/refresh pair with absolute expirations (unix seconds).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: i64,
    pub refresh_expires_at: i64,
}
