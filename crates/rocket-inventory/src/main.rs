//! Rocket Factory inventory server

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tonic::transport::Server;
use tracing::{error, info};

use rocket_core::Closer;
use rocket_core::closer::wait_for_signal;
use rocket_core::config::{DatabaseArgs, GrpcArgs, LoggerArgs, ShutdownArgs};
use rocket_core::tracing_init::init_tracing;
use rocket_proto::v1::inventory_service_server::InventoryServiceServer;

use rocket_inventory::config::SeedArgs;
use rocket_inventory::seed::seed_if_empty;
use rocket_inventory::server::InventoryServiceImpl;
use rocket_inventory::service::PartService;
use rocket_inventory::storage::InventoryDatabase;

#[derive(Parser, Debug)]
#[command(name = "rocket-inventory")]
#[command(version, about = "Rocket Factory inventory service - part catalog")]
struct Args {
    #[command(flatten)]
    logger: LoggerArgs,

    #[command(flatten)]
    grpc: GrpcArgs,

    #[command(flatten)]
    database: DatabaseArgs,

    #[command(flatten)]
    seed: SeedArgs,

    #[command(flatten)]
    shutdown: ShutdownArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing("rocket_inventory", &args.logger);

    let addr = args.grpc.addr();
    info!(version = env!("CARGO_PKG_VERSION"), %addr, "Starting rocket-inventory");

    let closer = Closer::new();
    let db = InventoryDatabase::open(&args.database.path, args.database.max_connections).await?;
    {
        let db = db.clone();
        closer
            .add("inventory-database", move || async move {
                db.close().await;
                Ok::<(), String>(())
            })
            .await;
    }

    seed_if_empty(&db, &args.seed.source()).await?;

    let parts = Arc::new(PartService::new(Arc::new(db)));

    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<InventoryServiceServer<InventoryServiceImpl>>()
        .await;

    info!(%addr, "Inventory gRPC server listening");
    Server::builder()
        .http2_keepalive_interval(Some(Duration::from_secs(30)))
        .http2_keepalive_timeout(Some(Duration::from_secs(10)))
        .add_service(health_service)
        .add_service(InventoryServiceServer::new(InventoryServiceImpl::new(parts)))
        .serve_with_shutdown(addr, async {
            if let Err(e) = wait_for_signal().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
        })
        .await?;

    let report = closer.close_all(args.shutdown.timeout).await;
    info!(?report, "Inventory stopped");
    Ok(())
}
