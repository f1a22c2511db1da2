//! JWT access/refresh pairs and their revocation.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use rocket_core::db::unix_timestamp;
use rocket_core::{ErrorCode, Result};

use crate::auth::jwt::IssuedToken;
use crate::auth::{Claims, JwtManager, TokenBlacklist, TokenError, TokenType};
use crate::model::TokenPair;

use super::{UserService, token_error};

pub struct TokenService {
    users: Arc<UserService>,
    jwt: Arc<JwtManager>,
    blacklist: TokenBlacklist,
}

impl TokenService {
    pub fn new(users: Arc<UserService>, jwt: Arc<JwtManager>, blacklist: TokenBlacklist) -> Self {
        Self {
            users,
            jwt,
            blacklist,
        }
    }

    /// Verify credentials and mint an access/refresh pair.
    pub async fn login(&self, login: &str, password: &str) -> Result<TokenPair> {
        let user = self.users.verify_credentials(login, password).await?;
        let pair = self.mint_pair(&user.user_uuid.to_string(), &user.login)?;
        info!(user_uuid = %user.user_uuid, "Token pair issued");
        Ok(pair)
    }

    /// Mint a new access token; the refresh token stays valid.
    pub async fn get_access_token(&self, refresh_token: &str) -> Result<IssuedToken> {
        let claims = self.validate(refresh_token, TokenType::Refresh).await?;
        self.jwt
            .issue_access_token(&claims.sub, &claims.username)
            .map_err(token_error)
    }

    /// Rotate: blacklist the presented refresh token and mint a new pair.
    ///
    /// A refresh token rotates at most once, even under concurrent calls.
    pub async fn get_refresh_token(&self, refresh_token: &str) -> Result<TokenPair> {
        let claims = self.validate(refresh_token, TokenType::Refresh).await?;
        let won = self
            .blacklist
            .revoke_once(refresh_token, remaining(claims.exp, unix_timestamp()))
            .await;
        if !won {
            warn!(user_uuid = %claims.sub, "Refresh token already rotated");
            return Err(token_error(TokenError::Invalid("token is blacklisted".into())));
        }
        let pair = self.mint_pair(&claims.sub, &claims.username)?;
        info!(user_uuid = %claims.sub, "Refresh token rotated");
        Ok(pair)
    }

    /// Blacklist a token for its remaining lifetime.
    ///
    /// Only tokens signed by this service are stored. Returns `false` when
    /// the token had already expired (nothing stored).
    pub async fn revoke_token(&self, token: &str) -> Result<bool> {
        let claims = match self.jwt.validate_any(token) {
            Ok(claims) => claims,
            Err(TokenError::Expired) => return Ok(false),
            Err(e) => return Err(token_error(e)),
        };
        let ttl = remaining(claims.exp, unix_timestamp());
        if ttl.is_zero() {
            return Ok(false);
        }
        self.blacklist.revoke(token, ttl).await;
        info!(user_uuid = %claims.sub, "Token revoked");
        Ok(true)
    }

    /// Reject every token of the user issued up to now.
    ///
    /// The caller proves ownership with a live access token for the same user.
    pub async fn revoke_all_for_user(&self, user_uuid: Uuid, access_token: &str) -> Result<()> {
        let claims = self.validate(access_token, TokenType::Access).await?;
        if claims.sub != user_uuid.to_string() {
            warn!(user_uuid = %user_uuid, caller = %claims.sub, "Revoke-all for another user");
            return Err(token_error(TokenError::Invalid("subject mismatch".into())));
        }
        self.users.get_user(user_uuid).await?;
        self.blacklist
            .revoke_all_for_user(&user_uuid.to_string(), unix_timestamp())
            .await;
        info!(user_uuid = %user_uuid, "All tokens revoked for user");
        Ok(())
    }

    /// Full validation: signature, algorithm, type, expiry, blacklist and
    /// per-user marker.
    pub async fn validate(&self, token: &str, expected: TokenType) -> Result<Claims> {
        let claims = self.jwt.validate(token, expected).map_err(token_error)?;
        if self.blacklist.is_revoked(token).await {
            return Err(token_error(TokenError::Invalid("token is blacklisted".into())));
        }
        if let Some(marker) = self.blacklist.user_revoked_at(&claims.sub).await {
            // iat has one-second resolution: a token minted in the same
            // second as the marker is treated as issued before it.
            if claims.iat <= marker {
                return Err(ErrorCode::TokenRevoked.into());
            }
        }
        Ok(claims)
    }

    fn mint_pair(&self, user_uuid: &str, username: &str) -> Result<TokenPair> {
        let access = self
            .jwt
            .issue_access_token(user_uuid, username)
            .map_err(token_error)?;
        let refresh = self
            .jwt
            .issue_refresh_token(user_uuid, username)
            .map_err(token_error)?;
        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            access_expires_at: access.expires_at,
            refresh_expires_at: refresh.expires_at,
        })
    }
}

fn remaining(exp: i64, now: i64) -> Duration {
    #[allow(clippy::cast_sign_loss)]
    let secs = (exp - now).max(0) as u64;
    Duration::from_secs(secs)
}
