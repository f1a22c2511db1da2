//! SQLite storage for orders and the event outbox.

mod db;
mod models;
mod queries;


pub use db::OrderDatabase;
pub use rocket_core::db::DatabaseError;
