//! `X-Session-UUID` guard.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, error};

use rocket_core::ErrorCode;

use super::AppState;
use super::error::ApiError;
use crate::clients::{ClientError, SessionIdentity};

pub const SESSION_HEADER: &str = "x-session-uuid";

/// Identity of the caller, available to handlers behind the guard.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub SessionIdentity);

/// IAM answers that mean "this session is not usable".
const fn rejects_session(code: ErrorCode) -> bool {
    matches!(
        code,
        ErrorCode::SessionNotFound
            | ErrorCode::SessionExpired
            | ErrorCode::UserNotFound
            | ErrorCode::InvalidArgument
            | ErrorCode::InvalidCredentials
    )
}

/// Resolve the session with IAM and attach [`CurrentSession`].
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session_uuid = req
        .headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::MissingSession)?
        .to_string();

    let identity = match state.iam.whoami(&session_uuid).await {
        Ok(identity) => identity,
        Err(ClientError::Remote(e)) if rejects_session(e.code) => {
            debug!(code = %e.code, "Session rejected");
            return Err(ApiError::InvalidSession);
        }
        Err(e) => {
            error!(error = %e, "Session check failed");
            return Err(ApiError::Service(ErrorCode::InternalError.into()));
        }
    };

    debug!(user_uuid = %identity.user_uuid, login = %identity.login, "Session accepted");
    req.extensions_mut().insert(CurrentSession(identity));
    Ok(next.run(req).await)
}
