//! SQLite database for the IAM service.

rocket_core::define_database!(IamDatabase, "IAM database migrations complete");
