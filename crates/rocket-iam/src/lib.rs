//! `Rocket Factory` IAM service
//!
//! Users, opaque sessions backed by a durable store and a TTL cache, and a
//! parallel JWT access/refresh subsystem with a revocation blacklist.

pub mod app;
pub mod auth;
pub mod cache;
pub mod config;
pub mod model;
pub mod repository;
pub mod server;
pub mod service;
pub mod storage;
pub mod validation;
