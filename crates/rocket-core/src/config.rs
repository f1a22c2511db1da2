//! Environment configuration fragments.
//!
//! Every setting is read from an environment variable and may be overridden
//! on the command line. Binaries compose the fragments they need with
//! `#[command(flatten)]`:
//!
//! ```ignore
//! #[derive(clap::Parser)]
//! struct Args {
//!     #[command(flatten)]
//!     logger: rocket_core::config::LoggerArgs,
//!     #[command(flatten)]
//!     grpc: rocket_core::config::GrpcArgs,
//! }
//! ```

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::bus::{ConsumerConfig, ProducerConfig};

/// Parse a humane duration such as `200ms`, `5s`, `15m`, `24h` or `7d`.
///
/// A bare number is interpreted as seconds.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("empty duration".to_string());
    }

    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (digits, unit) = s.split_at(split);
    let value: u64 = digits
        .parse()
        .map_err(|_| format!("invalid duration `{input}`"))?;

    let duration = match unit.trim() {
        "ms" => Duration::from_millis(value),
        "" | "s" => Duration::from_secs(value),
        "m" => Duration::from_secs(value * 60),
        "h" => Duration::from_secs(value * 60 * 60),
        "d" => Duration::from_secs(value * 24 * 60 * 60),
        other => return Err(format!("unknown duration unit `{other}` in `{input}`")),
    };
    Ok(duration)
}

/// Logger settings.
#[derive(Debug, Clone, clap::Args)]
pub struct LoggerArgs {
    /// Default log level when `RUST_LOG` is not set.
    #[arg(long = "logger-level", env = "LOGGER_LEVEL", default_value = "info")]
    pub level: String,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long = "logger-as-json", env = "LOGGER_AS_JSON")]
    pub as_json: bool,
}

/// gRPC listener settings.
#[derive(Debug, Clone, clap::Args)]
pub struct GrpcArgs {
    #[arg(long = "grpc-host", env = "GRPC_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    #[arg(long = "grpc-port", env = "GRPC_PORT", default_value_t = 50051)]
    pub port: u16,
}

impl GrpcArgs {
    pub const fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, clap::Args)]
pub struct HttpArgs {
    #[arg(long = "http-host", env = "HTTP_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    #[arg(long = "http-port", env = "HTTP_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Upper bound for receiving a request before it is dropped.
    #[arg(
        long = "http-read-header-timeout",
        env = "HTTP_READ_HEADER_TIMEOUT",
        default_value = "5s",
        value_parser = parse_duration
    )]
    pub read_header_timeout: Duration,

    /// Grace period for in-flight requests on shutdown.
    #[arg(
        long = "http-shutdown-timeout",
        env = "HTTP_SHUTDOWN_TIMEOUT",
        default_value = "10s",
        value_parser = parse_duration
    )]
    pub shutdown_timeout: Duration,
}

impl HttpArgs {
    pub const fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Primary SQL store settings.
#[derive(Debug, Clone, clap::Args)]
pub struct DatabaseArgs {
    /// Path to the service's SQLite database file.
    #[arg(long = "database-path", env = "DATABASE_PATH")]
    pub path: PathBuf,

    #[arg(
        long = "database-max-connections",
        env = "DATABASE_MAX_CONNECTIONS",
        default_value_t = 5
    )]
    pub max_connections: u32,
}

/// Message bus settings.
#[derive(Debug, Clone, clap::Args)]
pub struct BusArgs {
    /// Path to the shared event log database.
    #[arg(long = "bus-database-path", env = "BUS_DATABASE_PATH")]
    pub path: PathBuf,

    #[arg(long = "bus-partitions", env = "BUS_PARTITIONS", default_value_t = 3)]
    pub partitions: u32,

    /// Retries for transient publish failures.
    #[arg(long = "bus-max-retries", env = "BUS_MAX_RETRIES", default_value_t = 3)]
    pub max_retries: u32,

    #[arg(
        long = "bus-poll-interval",
        env = "BUS_POLL_INTERVAL",
        default_value = "200ms",
        value_parser = parse_duration
    )]
    pub poll_interval: Duration,

    /// This instance's slot in its consumer group.
    #[arg(long = "bus-member-index", env = "BUS_MEMBER_INDEX", default_value_t = 0)]
    pub member_index: u32,

    /// Number of instances sharing the consumer group.
    #[arg(long = "bus-member-count", env = "BUS_MEMBER_COUNT", default_value_t = 1)]
    pub member_count: u32,
}

impl BusArgs {
    pub fn producer_config(&self) -> ProducerConfig {
        ProducerConfig {
            partitions: self.partitions,
            max_retries: self.max_retries,
            ..ProducerConfig::default()
        }
    }

    pub fn consumer_config(&self, group_id: &str, topic: &str) -> ConsumerConfig {
        ConsumerConfig {
            member_index: self.member_index,
            member_count: self.member_count,
            poll_interval: self.poll_interval,
            ..ConsumerConfig::new(group_id, topic, self.partitions)
        }
    }
}

/// Topic and consumer-group names.
#[derive(Debug, Clone, clap::Args)]
pub struct TopicArgs {
    #[arg(long = "order-paid-topic", env = "ORDER_PAID_TOPIC", default_value = "order.paid")]
    pub order_paid: String,

    #[arg(
        long = "ship-assembled-topic",
        env = "SHIP_ASSEMBLED_TOPIC",
        default_value = "ship.assembled"
    )]
    pub ship_assembled: String,

    #[arg(
        long = "order-consumer-group",
        env = "ORDER_CONSUMER_GROUP",
        default_value = "order-service"
    )]
    pub order_group: String,

    #[arg(
        long = "assembly-consumer-group",
        env = "ASSEMBLY_CONSUMER_GROUP",
        default_value = "assembly-service"
    )]
    pub assembly_group: String,
}

/// Process shutdown settings.
#[derive(Debug, Clone, clap::Args)]
pub struct ShutdownArgs {
    /// Deadline for running registered shutdown hooks.
    #[arg(
        long = "shutdown-timeout",
        env = "SHUTDOWN_TIMEOUT",
        default_value = "5s",
        value_parser = parse_duration
    )]
    pub timeout: Duration,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestArgs {
        #[command(flatten)]
        logger: LoggerArgs,
        #[command(flatten)]
        http: HttpArgs,
        #[command(flatten)]
        bus: BusArgs,
        #[command(flatten)]
        topics: TopicArgs,
    }

    #[test]
    fn parses_durations() {
        assert_eq!(parse_duration("200ms").unwrap(), Duration::from_millis(200));
        assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("15m").unwrap(), Duration::from_secs(900));
        assert_eq!(parse_duration("24h").unwrap(), Duration::from_secs(86_400));
        assert_eq!(parse_duration("2d").unwrap(), Duration::from_secs(172_800));
        assert_eq!(parse_duration("30").unwrap(), Duration::from_secs(30));
    }

    #[test]
    fn rejects_bad_durations() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("fast").is_err());
        assert!(parse_duration("5 weeks").is_err());
    }

    #[test]
    fn fragments_apply_defaults() {
        let args =
            TestArgs::try_parse_from(["test", "--bus-database-path", "/tmp/bus.db"]).unwrap();
        assert_eq!(args.logger.level, "info");
        assert!(!args.logger.as_json);
        assert_eq!(args.http.port, 8080);
        assert_eq!(args.http.read_header_timeout, Duration::from_secs(5));
        assert_eq!(args.http.shutdown_timeout, Duration::from_secs(10));
        assert_eq!(args.bus.partitions, 3);
        assert_eq!(args.bus.max_retries, 3);
        assert_eq!(args.topics.order_paid, "order.paid");
        assert_eq!(args.topics.ship_assembled, "ship.assembled");
        assert_eq!(args.topics.order_group, "order-service");

        let consumer = args.bus.consumer_config("g", "order.paid");
        assert_eq!(consumer.assigned_partitions(), vec![0, 1, 2]);
        assert_eq!(consumer.poll_interval, Duration::from_millis(200));
    }

    #[test]
    fn required_bus_path_is_enforced() {
        assert!(TestArgs::try_parse_from(["test"]).is_err());
    }
}
