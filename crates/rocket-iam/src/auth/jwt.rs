//! JWT token issuance and validation.
//!
//! Access and refresh tokens are HS256-signed with distinct secrets. Only
//! HS256 is accepted on the way in, which rules out algorithm confusion
//! (`none`, RS*/ES* headers carrying an HMAC key).

use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use rocket_core::db::unix_timestamp;

use super::claims::{Claims, TokenType};

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("token invalid: {0}")]
    Invalid(String),

    #[error("token revoked")]
    Revoked,

    #[error("token signing failed: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Invalid(e.to_string()),
        }
    }
}

/// A signed token together with its absolute expiry (unix seconds).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: i64,
}

/// Manages JWT token creation and validation.
#[derive(Clone)]
pub struct JwtManager {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    validation: Validation,
}

impl JwtManager {
    pub fn new(
        access_secret: &[u8],
        refresh_secret: &[u8],
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Self {
            access_encoding: EncodingKey::from_secret(access_secret),
            access_decoding: DecodingKey::from_secret(access_secret),
            refresh_encoding: EncodingKey::from_secret(refresh_secret),
            refresh_decoding: DecodingKey::from_secret(refresh_secret),
            access_ttl,
            refresh_ttl,
            validation,
        }
    }

    pub const fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Issue a token of the given type for a user.
    pub fn issue(
        &self,
        user_uuid: &str,
        username: &str,
        token_type: TokenType,
    ) -> Result<IssuedToken, TokenError> {
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        let now = unix_timestamp();
        #[allow(clippy::cast_possible_wrap)]
        let exp = now + ttl.as_secs() as i64;

        let claims = Claims {
            jti: uuid::Uuid::new_v4().to_string(),
            sub: user_uuid.to_string(),
            username: username.to_string(),
            iat: now,
            exp,
            token_type,
        };

        let token = self.sign(&claims)?;
        Ok(IssuedToken {
            token,
            expires_at: exp,
        })
    }

    pub fn issue_access_token(
        &self,
        user_uuid: &str,
        username: &str,
    ) -> Result<IssuedToken, TokenError> {
        self.issue(user_uuid, username, TokenType::Access)
    }

    pub fn issue_refresh_token(
        &self,
        user_uuid: &str,
        username: &str,
    ) -> Result<IssuedToken, TokenError> {
        self.issue(user_uuid, username, TokenType::Refresh)
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        let key = match claims.token_type {
            TokenType::Access => &self.access_encoding,
            TokenType::Refresh => &self.refresh_encoding,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature, algorithm, expiry and type; return the claims.
    ///
    /// Revocation is not checked here; see [`super::TokenBlacklist`].
    pub fn validate(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let key = match expected {
            TokenType::Access => &self.access_decoding,
            TokenType::Refresh => &self.refresh_decoding,
        };
        let claims = jsonwebtoken::decode::<Claims>(token, key, &self.validation)?.claims;
        if claims.token_type != expected {
            return Err(TokenError::Invalid(format!(
                "expected {expected} token, got {}",
                claims.token_type
            )));
        }
        Ok(claims)
    }

    /// Validate a token of either type.
    ///
    /// `Expired` wins over `Invalid` so callers can tell a genuine but stale
    /// token from a forged one.
    pub fn validate_any(&self, token: &str) -> Result<Claims, TokenError> {
        match self.validate(token, TokenType::Access) {
            Ok(claims) => Ok(claims),
            Err(TokenError::Expired) => match self.validate(token, TokenType::Refresh) {
                Ok(claims) => Ok(claims),
                Err(_) => Err(TokenError::Expired),
            },
            Err(_) => self.validate(token, TokenType::Refresh),
        }
    }
}
