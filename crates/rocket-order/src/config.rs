//! Order service configuration fragments.

use std::time::Duration;

use rocket_core::config::parse_duration;

/// Addresses of the services the order service calls.
#[derive(Debug, Clone, clap::Args)]
pub struct ClientArgs {
    #[arg(
        long = "inventory-grpc-addr",
        env = "INVENTORY_GRPC_ADDR",
        default_value = "http://127.0.0.1:50052"
    )]
    pub inventory_addr: String,

    #[arg(
        long = "payment-grpc-addr",
        env = "PAYMENT_GRPC_ADDR",
        default_value = "http://127.0.0.1:50053"
    )]
    pub payment_addr: String,

    #[arg(
        long = "iam-grpc-addr",
        env = "IAM_GRPC_ADDR",
        default_value = "http://127.0.0.1:50051"
    )]
    pub iam_addr: String,

    /// Connect and per-call deadline for outbound calls.
    #[arg(
        long = "client-timeout",
        env = "CLIENT_TIMEOUT",
        default_value = "5s",
        value_parser = parse_duration
    )]
    pub timeout: Duration,
}

/// HTTP API limits beyond the shared listener settings.
#[derive(Debug, Clone, clap::Args)]
pub struct ApiArgs {
    /// Deadline for a whole request, including outbound calls.
    #[arg(
        long = "http-request-timeout",
        env = "HTTP_REQUEST_TIMEOUT",
        default_value = "30s",
        value_parser = parse_duration
    )]
    pub request_timeout: Duration,
}

/// Outbox relay tuning.
#[derive(Debug, Clone, clap::Args)]
pub struct OutboxArgs {
    #[arg(
        long = "outbox-relay-interval",
        env = "OUTBOX_RELAY_INTERVAL",
        default_value = "5s",
        value_parser = parse_duration
    )]
    pub relay_interval: Duration,

    #[arg(long = "outbox-batch-size", env = "OUTBOX_BATCH_SIZE", default_value_t = 100)]
    pub batch_size: u32,
}
