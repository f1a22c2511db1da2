//! SQLite storage for the part catalog.

mod db;
mod models;
mod queries;

#[cfg(test)]
mod tests;

pub use db::InventoryDatabase;
pub use rocket_core::db::DatabaseError;
