//! JSON error responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::debug;

use rocket_core::{ErrorCode, ServiceError};

/// Errors returned by the HTTP API as `{"error":{"code":..,"message":..}}`.
#[derive(Debug)]
pub enum ApiError {
    Service(ServiceError),
    /// No `X-Session-UUID` header.
    MissingSession,
    /// IAM does not know the session or it expired.
    InvalidSession,
    /// The request body could not be parsed. The parser's detail is logged,
    /// never echoed back.
    BadRequest,
    NotFound,
    Timeout,
}

pub(crate) const BAD_REQUEST_MESSAGE: &str = "Request body is not valid JSON for this endpoint";

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: &'a str,
    message: &'a str,
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        Self::Service(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(
            status = %rejection.status(),
            detail = %rejection.body_text(),
            "Rejected request body"
        );
        Self::BadRequest
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::Service(e) => (
                StatusCode::from_u16(e.code.http_status())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                e.code.as_str(),
                e.message.as_str(),
            ),
            Self::MissingSession => (
                StatusCode::UNAUTHORIZED,
                "MISSING_SESSION",
                "X-Session-UUID header is required",
            ),
            Self::InvalidSession => (
                StatusCode::UNAUTHORIZED,
                "INVALID_SESSION",
                "Session is invalid or expired",
            ),
            Self::BadRequest => (
                StatusCode::BAD_REQUEST,
                ErrorCode::InvalidArgument.as_str(),
                BAD_REQUEST_MESSAGE,
            ),
            Self::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", "Route not found"),
            Self::Timeout => (
                StatusCode::REQUEST_TIMEOUT,
                ErrorCode::Cancelled.as_str(),
                "Request timed out",
            ),
        };

        (
            status,
            Json(ErrorBody {
                error: ErrorDetail { code, message },
            }),
        )
            .into_response()
    }
}
