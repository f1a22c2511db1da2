//! SQLite storage for the IAM service.
//!
//! Persists users, their notification methods, and sessions.

mod db;
mod models;
mod queries;


pub use db::IamDatabase;
pub use rocket_core::db::DatabaseError;
