//! IAM-specific configuration fragments.

use std::time::Duration;

use rocket_core::config::parse_duration;

/// Session cache settings.
#[derive(Debug, Clone, clap::Args)]
pub struct CacheArgs {
    /// Lifetime of a new session (and of its cached copy).
    #[arg(
        long = "cache-session-ttl",
        env = "CACHE_SESSION_TTL",
        default_value = "24h",
        value_parser = parse_duration
    )]
    pub session_ttl: Duration,

    #[arg(
        long = "cache-max-capacity",
        env = "CACHE_MAX_CAPACITY",
        default_value_t = 100_000
    )]
    pub max_capacity: u64,
}

/// JWT signing settings.
#[derive(Clone, clap::Args)]
pub struct JwtArgs {
    #[arg(long = "jwt-access-token-secret", env = "JWT_ACCESS_TOKEN_SECRET")]
    pub access_secret: String,

    #[arg(long = "jwt-refresh-token-secret", env = "JWT_REFRESH_TOKEN_SECRET")]
    pub refresh_secret: String,

    #[arg(
        long = "jwt-access-token-ttl",
        env = "JWT_ACCESS_TOKEN_TTL",
        default_value = "15m",
        value_parser = parse_duration
    )]
    pub access_ttl: Duration,

    #[arg(
        long = "jwt-refresh-token-ttl",
        env = "JWT_REFRESH_TOKEN_TTL",
        default_value = "24h",
        value_parser = parse_duration
    )]
    pub refresh_ttl: Duration,
}

// Secrets stay out of logs.
impl std::fmt::Debug for JwtArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtArgs")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl JwtArgs {
    /// Access and refresh tokens must not share a signing key.
    pub fn validate(&self) -> Result<(), String> {
        if self.access_secret.is_empty() || self.refresh_secret.is_empty() {
            return Err("JWT secrets must not be empty".into());
        }
        if self.access_secret == self.refresh_secret {
            return Err("JWT access and refresh secrets must differ".into());
        }
        Ok(())
    }
}
