//! Shared tracing/logging initialization.
//!
//! Every service binary sets up `tracing_subscriber` the same way: an
//! env-filter seeded from `LOGGER_LEVEL` and optional JSON output.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggerArgs;

/// Build the filter directive for a service.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies to the
/// service crate and `rocket_core`, and everything else logs at `warn`.
pub fn filter_directive(service_crate: &str, level: &str) -> String {
    std::env::var("RUST_LOG")
        .unwrap_or_else(|_| format!("warn,{service_crate}={level},rocket_core={level}"))
}

/// Initialise the global tracing subscriber.
///
/// * `service_crate` -- crate name of the binary (e.g. `"rocket_iam"`).
/// * `logger` -- `LOGGER_LEVEL` / `LOGGER_AS_JSON` settings.
pub fn init_tracing(service_crate: &str, logger: &LoggerArgs) {
    let env_filter =
        tracing_subscriber::EnvFilter::new(filter_directive(service_crate, &logger.level));
    if logger.as_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
