//! Domain services of the IAM subsystem.
//!
//! Services speak [`ServiceError`]; storage, cache and crypto failures are
//! logged here and mapped onto the shared error taxonomy.

pub mod session;
pub mod token;
pub mod user;

pub use session::SessionService;
pub use token::TokenService;
pub use user::UserService;

use tracing::error;

use rocket_core::db::DatabaseError;
use rocket_core::{ErrorCode, ServiceError};

use crate::auth::{PasswordError, TokenError};

pub(crate) fn database_error(e: DatabaseError) -> ServiceError {
    error!(error = %e, "Database operation failed");
    ErrorCode::DatabaseError.into()
}

pub(crate) fn password_error(e: PasswordError) -> ServiceError {
    error!(error = %e, "Password hashing failed");
    ErrorCode::HashingFailed.into()
}

pub(crate) fn token_error(e: TokenError) -> ServiceError {
    match e {
        TokenError::Expired => ErrorCode::TokenExpired.into(),
        TokenError::Revoked => ErrorCode::TokenRevoked.into(),
        TokenError::Invalid(reason) => {
            tracing::debug!(reason = %reason, "Token rejected");
            ErrorCode::TokenInvalid.into()
        }
        TokenError::Signing(reason) => {
            error!(error = %reason, "Token signing failed");
            ErrorCode::InternalError.into()
        }
    }
}
