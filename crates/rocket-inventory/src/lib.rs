//! `Rocket Factory` inventory service
//!
//! Serves the part catalog: lookup by id and filtered listing, where each
//! filter field is an OR over its members and fields AND together.

pub mod config;
pub mod filter;
pub mod model;
pub mod repository;
pub mod seed;
pub mod server;
pub mod service;
pub mod storage;
