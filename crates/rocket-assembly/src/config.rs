//! Assembly worker settings.

/// Simulated build time bounds, in whole seconds.
#[derive(Debug, Clone, clap::Args)]
pub struct AssemblyArgs {
    #[arg(
        long = "assembly-min-build-secs",
        env = "ASSEMBLY_MIN_BUILD_SECS",
        default_value_t = 1
    )]
    pub min_build_secs: u64,

    #[arg(
        long = "assembly-max-build-secs",
        env = "ASSEMBLY_MAX_BUILD_SECS",
        default_value_t = 10
    )]
    pub max_build_secs: u64,
}

impl AssemblyArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.min_build_secs > self.max_build_secs {
            return Err(format!(
                "ASSEMBLY_MIN_BUILD_SECS ({}) exceeds ASSEMBLY_MAX_BUILD_SECS ({})",
                self.min_build_secs, self.max_build_secs
            ));
        }
        Ok(())
    }
}
