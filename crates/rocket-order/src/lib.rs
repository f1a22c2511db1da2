//! `Rocket Factory` order service
//!
//! Owns the order lifecycle: prices orders against the inventory catalog,
//! drives payment through the payment service, announces paid orders on the
//! bus and marks them assembled when the assembly worker reports back.
//! Clients reach it over an HTTP/JSON API guarded by IAM sessions.

pub mod clients;
pub mod config;
pub mod events;
pub mod http;
pub mod model;
pub mod repository;
pub mod service;
pub mod storage;

#[cfg(test)]
mod testing;
