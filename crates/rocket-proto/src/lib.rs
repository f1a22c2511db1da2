//! Rocket Factory Protocol Buffers
//!
//! Generated protobuf code for the Rocket Factory services.
//!
//! This crate contains:
//! - `AuthService`, `UserService` and `JwtService` for identity and access
//! - `InventoryService` for the part catalog
//! - `PaymentService` for order payments
//! - `OrderPaid` / `ShipAssembled` event payloads carried on the message bus

#![allow(clippy::derive_partial_eq_without_eq)]

/// Rocket Factory v1 API definitions.
///
/// All generated types and services are included here.
pub mod v1 {
    tonic::include_proto!("rocket.v1");
}

// Re-export v1 as the default API version for convenience
pub use v1::*;

// Re-export prost_types for downstream crates that need Timestamp conversion
pub use prost_types;
