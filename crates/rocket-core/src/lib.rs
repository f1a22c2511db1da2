//! `Rocket Factory` Core Library
//!
//! Shared functionality for the Rocket Factory services:
//! - Stable error taxonomy and its gRPC/HTTP mappings
//! - Environment configuration fragments
//! - SQLite pool helpers and the `define_database!` macro
//! - Process-wide shutdown `Closer`
//! - Schema-versioned event codec and the durable message bus

pub mod bus;
pub mod closer;
pub mod config;
pub mod convert;
pub mod db;
pub mod error;
pub mod events;
pub mod tracing_init;

pub use closer::Closer;
pub use error::{ErrorCode, Result, ServiceError};
