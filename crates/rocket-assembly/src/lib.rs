//! `Rocket Factory` assembly worker
//!
//! Consumes `OrderPaid` events, simulates building the ship and publishes
//! `ShipAssembled` for the same order.

pub mod config;
pub mod worker;
