//! Stable, transport-agnostic error taxonomy.
//!
//! Services return [`ServiceError`], which pairs an [`ErrorCode`] with a short
//! human message. Transport layers map the code to their native status
//! (`tonic::Code` for gRPC, an HTTP status for the JSON API). The underlying
//! cause of a failure is logged where it happens and never copied into the
//! message.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tonic::metadata::MetadataValue;

/// Result type alias using [`ServiceError`].
pub type Result<T> = std::result::Result<T, ServiceError>;

/// gRPC metadata key carrying the machine-readable error code.
pub const ERROR_CODE_METADATA_KEY: &str = "x-error-code";

/// Machine-readable error codes shared by every service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    UserNotFound,
    UserAlreadyExists,
    InvalidCredentials,
    EmptyLogin,
    EmptyPassword,
    EmptyEmail,
    InvalidLogin,
    InvalidEmail,
    WeakPassword,
    SessionNotFound,
    SessionExpired,
    TokenInvalid,
    TokenExpired,
    TokenRevoked,
    OrderNotFound,
    OrderAlreadyPaid,
    OrderCancelled,
    OrderInvalidTransition,
    PartsNotSpecified,
    PartsNotFound,
    PartNotFound,
    PaymentFailed,
    InventoryUnavailable,
    EventPublishFailed,
    HashingFailed,
    DatabaseError,
    CacheError,
    InvalidArgument,
    Cancelled,
    InternalError,
}

impl ErrorCode {
    pub const ALL: [Self; 30] = [
        Self::UserNotFound,
        Self::UserAlreadyExists,
        Self::InvalidCredentials,
        Self::EmptyLogin,
        Self::EmptyPassword,
        Self::EmptyEmail,
        Self::InvalidLogin,
        Self::InvalidEmail,
        Self::WeakPassword,
        Self::SessionNotFound,
        Self::SessionExpired,
        Self::TokenInvalid,
        Self::TokenExpired,
        Self::TokenRevoked,
        Self::OrderNotFound,
        Self::OrderAlreadyPaid,
        Self::OrderCancelled,
        Self::OrderInvalidTransition,
        Self::PartsNotSpecified,
        Self::PartsNotFound,
        Self::PartNotFound,
        Self::PaymentFailed,
        Self::InventoryUnavailable,
        Self::EventPublishFailed,
        Self::HashingFailed,
        Self::DatabaseError,
        Self::CacheError,
        Self::InvalidArgument,
        Self::Cancelled,
        Self::InternalError,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::EmptyLogin => "EMPTY_LOGIN",
            Self::EmptyPassword => "EMPTY_PASSWORD",
            Self::EmptyEmail => "EMPTY_EMAIL",
            Self::InvalidLogin => "INVALID_LOGIN",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::WeakPassword => "WEAK_PASSWORD",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::TokenInvalid => "TOKEN_INVALID",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenRevoked => "TOKEN_REVOKED",
            Self::OrderNotFound => "ORDER_NOT_FOUND",
            Self::OrderAlreadyPaid => "ORDER_ALREADY_PAID",
            Self::OrderCancelled => "ORDER_CANCELLED",
            Self::OrderInvalidTransition => "ORDER_INVALID_TRANSITION",
            Self::PartsNotSpecified => "PARTS_NOT_SPECIFIED",
            Self::PartsNotFound => "PARTS_NOT_FOUND",
            Self::PartNotFound => "PART_NOT_FOUND",
            Self::PaymentFailed => "PAYMENT_FAILED",
            Self::InventoryUnavailable => "INVENTORY_UNAVAILABLE",
            Self::EventPublishFailed => "EVENT_PUBLISH_FAILED",
            Self::HashingFailed => "HASHING_FAILED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::CacheError => "CACHE_ERROR",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::Cancelled => "CANCELLED",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Message used when the caller has nothing more specific to say.
    pub const fn default_message(&self) -> &'static str {
        match self {
            Self::UserNotFound => "User not found",
            Self::UserAlreadyExists => "User with this login already exists",
            Self::InvalidCredentials => "Invalid credentials",
            Self::EmptyLogin => "Login must not be empty",
            Self::EmptyPassword => "Password must not be empty",
            Self::EmptyEmail => "Email must not be empty",
            Self::InvalidLogin => "Login must be 3-50 characters of letters, digits or underscore",
            Self::InvalidEmail => "Invalid email address",
            Self::WeakPassword => "Password does not meet strength requirements",
            Self::SessionNotFound => "Session not found",
            Self::SessionExpired => "Session expired",
            Self::TokenInvalid => "Invalid token",
            Self::TokenExpired => "Token expired",
            Self::TokenRevoked => "Token revoked",
            Self::OrderNotFound => "Order not found",
            Self::OrderAlreadyPaid => "Order already paid",
            Self::OrderCancelled => "Order cancelled",
            Self::OrderInvalidTransition => "Order status transition not allowed",
            Self::PartsNotSpecified => "Parts not specified",
            Self::PartsNotFound => "Some parts were not found",
            Self::PartNotFound => "Part not found",
            Self::PaymentFailed => "Payment failed",
            Self::InventoryUnavailable => "Inventory service unavailable",
            Self::EventPublishFailed => "Event publish failed",
            Self::HashingFailed => "Password hashing failed",
            Self::DatabaseError => "Database error",
            Self::CacheError => "Cache error",
            Self::InvalidArgument => "Invalid argument",
            Self::Cancelled => "Request cancelled",
            Self::InternalError => "Internal error",
        }
    }

    /// gRPC status code for this error.
    pub const fn grpc_code(&self) -> tonic::Code {
        use tonic::Code;
        match self {
            Self::UserNotFound
            | Self::SessionNotFound
            | Self::OrderNotFound
            | Self::PartNotFound
            | Self::PartsNotFound => Code::NotFound,
            Self::UserAlreadyExists => Code::AlreadyExists,
            Self::InvalidCredentials
            | Self::SessionExpired
            | Self::TokenInvalid
            | Self::TokenExpired
            | Self::TokenRevoked => Code::Unauthenticated,
            Self::EmptyLogin
            | Self::EmptyPassword
            | Self::EmptyEmail
            | Self::InvalidLogin
            | Self::InvalidEmail
            | Self::WeakPassword
            | Self::PartsNotSpecified
            | Self::InvalidArgument => Code::InvalidArgument,
            Self::OrderAlreadyPaid | Self::OrderCancelled | Self::OrderInvalidTransition => {
                Code::FailedPrecondition
            }
            Self::PaymentFailed => Code::Aborted,
            Self::InventoryUnavailable => Code::Unavailable,
            Self::Cancelled => Code::Cancelled,
            Self::EventPublishFailed
            | Self::HashingFailed
            | Self::DatabaseError
            | Self::CacheError
            | Self::InternalError => Code::Internal,
        }
    }

    /// HTTP status code for this error.
    pub const fn http_status(&self) -> u16 {
        match self.grpc_code() {
            tonic::Code::NotFound => 404,
            tonic::Code::AlreadyExists | tonic::Code::FailedPrecondition => 409,
            tonic::Code::Unauthenticated => 401,
            tonic::Code::InvalidArgument => 400,
            tonic::Code::Aborted => 502,
            tonic::Code::Unavailable => 503,
            tonic::Code::Cancelled => 408,
            _ => 500,
        }
    }

    /// Fallback mapping used when a remote status carries no explicit code.
    pub const fn from_grpc_code(code: tonic::Code) -> Self {
        use tonic::Code;
        match code {
            Code::InvalidArgument | Code::OutOfRange => Self::InvalidArgument,
            Code::Unauthenticated | Code::PermissionDenied => Self::InvalidCredentials,
            Code::Cancelled | Code::DeadlineExceeded => Self::Cancelled,
            _ => Self::InternalError,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorCode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s == "ORDER_ALREADY_CANCELLED" {
            return Ok(Self::OrderCancelled);
        }
        Self::ALL
            .iter()
            .find(|code| code.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown error code: {s}"))
    }
}

/// Error returned by domain services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct ServiceError {
    pub code: ErrorCode,
    pub message: String,
}

impl ServiceError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Rebuild a service error from a remote gRPC status.
    ///
    /// Prefers the `x-error-code` metadata set by [`From<ServiceError> for Status`];
    /// falls back to the status code.
    pub fn from_status(status: &tonic::Status) -> Self {
        let code = status
            .metadata()
            .get(ERROR_CODE_METADATA_KEY)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<ErrorCode>().ok())
            .unwrap_or_else(|| ErrorCode::from_grpc_code(status.code()));
        Self::new(code, status.message())
    }
}

impl From<ErrorCode> for ServiceError {
    fn from(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }
}

impl From<ServiceError> for tonic::Status {
    fn from(err: ServiceError) -> Self {
        let mut status = Self::new(err.code.grpc_code(), err.message);
        status.metadata_mut().insert(
            ERROR_CODE_METADATA_KEY,
            MetadataValue::from_static(err.code.as_str()),
        );
        status
    }
}
