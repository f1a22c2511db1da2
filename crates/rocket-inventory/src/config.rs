//! Inventory-specific configuration.

use std::path::PathBuf;

use crate::seed::SeedSource;

/// Catalog seeding settings.
#[derive(Debug, Clone, clap::Args)]
pub struct SeedArgs {
    /// Seed the built-in demo catalog when the store is empty.
    #[arg(
        long = "inventory-seed-demo",
        env = "INVENTORY_SEED_DEMO",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub demo: bool,

    /// JSON catalog to load instead of the demo catalog.
    #[arg(long = "inventory-seed-path", env = "INVENTORY_SEED_PATH")]
    pub path: Option<PathBuf>,
}

impl SeedArgs {
    /// A catalog file wins over the demo flag.
    pub fn source(&self) -> SeedSource {
        match (&self.path, self.demo) {
            (Some(path), _) => SeedSource::File(path.clone()),
            (None, true) => SeedSource::Demo,
            (None, false) => SeedSource::None,
        }
    }
}
