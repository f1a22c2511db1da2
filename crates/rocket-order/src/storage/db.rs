//! Order database connection.

rocket_core::define_database!(OrderDatabase, "Order database migrations complete");
