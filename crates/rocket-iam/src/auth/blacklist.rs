//! Revocation blacklist for JWTs.
//!
//! Revoked tokens are keyed by `hex(SHA-256(token))` and kept only for the
//! token's remaining lifetime, so the set cleans itself up. Per-user
//! markers record "everything issued before this instant is revoked".
//!
//! Neither cache has a size limit: an evicted entry would silently make a
//! revoked token valid again. Callers only store verified tokens.

use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache;
use sha2::{Digest, Sha256};
use tracing::debug;

struct RemainingLifetime;

impl Expiry<String, Duration> for RemainingLifetime {
    fn expire_after_create(
        &self,
        _key: &String,
        ttl: &Duration,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(*ttl)
    }
}

#[derive(Clone)]
pub struct TokenBlacklist {
    revoked: Cache<String, Duration>,
    user_markers: Cache<String, i64>,
}

impl TokenBlacklist {
    /// `marker_ttl` should be the refresh token lifetime: once it has passed
    /// no token issued before the marker can still be valid.
    pub fn new(marker_ttl: Duration) -> Self {
        Self {
            revoked: Cache::builder().expire_after(RemainingLifetime).build(),
            user_markers: Cache::builder().time_to_live(marker_ttl).build(),
        }
    }

    /// Hash a token for storage (raw tokens are never kept).
    pub fn token_key(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Blacklist `token` for `ttl`. A zero ttl is a no-op.
    pub async fn revoke(&self, token: &str, ttl: Duration) {
        if ttl.is_zero() {
            return;
        }
        let key = Self::token_key(token);
        debug!(key = %key, ttl_secs = ttl.as_secs(), "Token blacklisted");
        self.revoked.insert(key, ttl).await;
    }

    /// Blacklist `token` unless it is already there.
    ///
    /// Returns `true` only for the caller whose insert created the entry, so
    /// concurrent callers racing on the same token see exactly one winner.
    pub async fn revoke_once(&self, token: &str, ttl: Duration) -> bool {
        let key = Self::token_key(token);
        let fresh = self
            .revoked
            .entry(key.clone())
            .or_insert(ttl.max(Duration::from_secs(1)))
            .await
            .is_fresh();
        if fresh {
            debug!(key = %key, ttl_secs = ttl.as_secs(), "Token blacklisted");
        }
        fresh
    }

    pub async fn is_revoked(&self, token: &str) -> bool {
        self.revoked.get(&Self::token_key(token)).await.is_some()
    }

    /// Revoke every token of `user_uuid` issued at or before `at`.
    pub async fn revoke_all_for_user(&self, user_uuid: &str, at: i64) {
        self.user_markers.insert(user_uuid.to_string(), at).await;
    }

    pub async fn user_revoked_at(&self, user_uuid: &str) -> Option<i64> {
        self.user_markers.get(user_uuid).await
    }
}
