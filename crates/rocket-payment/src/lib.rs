//! `Rocket Factory` payment service
//!
//! Accepts a payment for an order and hands back a transaction id.

pub mod server;
pub mod service;
