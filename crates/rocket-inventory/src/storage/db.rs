//! Inventory database connection.

rocket_core::define_database!(InventoryDatabase, "Inventory database migrations complete");
