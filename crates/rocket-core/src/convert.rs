//! Conversions shared by the gRPC and HTTP boundaries.

use prost_types::Timestamp;
use uuid::Uuid;

use crate::error::{ErrorCode, ServiceError};

/// Parse a UUID coming from a request field.
pub fn parse_uuid(value: &str, field: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(value.trim()).map_err(|_| {
        ServiceError::new(
            ErrorCode::InvalidArgument,
            format!("{field} must be a valid UUID"),
        )
    })
}

/// Unix seconds to a protobuf timestamp.
pub const fn timestamp(unix_secs: i64) -> Timestamp {
    Timestamp {
        seconds: unix_secs,
        nanos: 0,
    }
}

/// Protobuf timestamp to unix seconds (sub-second precision is dropped).
pub fn unix_secs(ts: Option<&Timestamp>) -> i64 {
    ts.map_or(0, |t| t.seconds)
}
