//! Rocket Factory payment server

use std::time::Duration;

use clap::Parser;
use tonic::transport::Server;
use tracing::{error, info};

use rocket_core::closer::wait_for_signal;
use rocket_core::config::{GrpcArgs, LoggerArgs};
use rocket_core::tracing_init::init_tracing;
use rocket_proto::v1::payment_service_server::PaymentServiceServer;

use rocket_payment::server::PaymentServiceImpl;
use rocket_payment::service::PaymentService;

#[derive(Parser, Debug)]
#[command(name = "rocket-payment")]
#[command(version, about = "Rocket Factory payment service")]
struct Args {
    #[command(flatten)]
    logger: LoggerArgs,

    #[command(flatten)]
    grpc: GrpcArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing("rocket_payment", &args.logger);

    let addr = args.grpc.addr();
    info!(version = env!("CARGO_PKG_VERSION"), %addr, "Starting rocket-payment");

    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<PaymentServiceServer<PaymentServiceImpl>>()
        .await;

    Server::builder()
        .http2_keepalive_interval(Some(Duration::from_secs(30)))
        .http2_keepalive_timeout(Some(Duration::from_secs(10)))
        .add_service(health_service)
        .add_service(PaymentServiceServer::new(PaymentServiceImpl::new(
            PaymentService::new(),
        )))
        .serve_with_shutdown(addr, async {
            if let Err(e) = wait_for_signal().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
        })
        .await?;

    info!("Payment stopped");
    Ok(())
}
