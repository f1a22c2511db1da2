//! Rocket Factory IAM server

use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tonic::transport::Server;
use tracing::{error, info};

use rocket_core::Closer;
use rocket_core::closer::wait_for_signal;
use rocket_core::config::{DatabaseArgs, GrpcArgs, LoggerArgs, ShutdownArgs};
use rocket_core::tracing_init::init_tracing;
use rocket_proto::v1::auth_service_server::AuthServiceServer;
use rocket_proto::v1::jwt_service_server::JwtServiceServer;
use rocket_proto::v1::user_service_server::UserServiceServer;

use rocket_iam::app::{Iam, IamSettings};
use rocket_iam::config::{CacheArgs, JwtArgs};
use rocket_iam::server::{AuthServiceImpl, JwtServiceImpl, UserServiceImpl};
use rocket_iam::storage::IamDatabase;

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(3600);

#[derive(Parser, Debug)]
#[command(name = "rocket-iam")]
#[command(version, about = "Rocket Factory IAM service - users, sessions and tokens")]
struct Args {
    #[command(flatten)]
    logger: LoggerArgs,

    #[command(flatten)]
    grpc: GrpcArgs,

    #[command(flatten)]
    database: DatabaseArgs,

    #[command(flatten)]
    cache: CacheArgs,

    #[command(flatten)]
    jwt: JwtArgs,

    #[command(flatten)]
    shutdown: ShutdownArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing("rocket_iam", &args.logger);
    args.jwt.validate().map_err(anyhow::Error::msg)?;

    let addr = args.grpc.addr();
    info!(version = env!("CARGO_PKG_VERSION"), %addr, "Starting rocket-iam");

    let closer = Closer::new();

    let db = IamDatabase::open(&args.database.path, args.database.max_connections).await?;
    {
        let db = db.clone();
        closer
            .add("iam-database", move || async move {
                db.close().await;
                Ok::<(), String>(())
            })
            .await;
    }

    let iam = Iam::build(db, &IamSettings::from_args(&args.cache, &args.jwt));
    if let Err(e) = iam.warmup_cache().await {
        error!(error = %e, "Session cache warmup failed, continuing with a cold cache");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let purge = iam.spawn_session_purge(SESSION_PURGE_INTERVAL, shutdown_rx);
    closer
        .add("session-purge", move || async move { purge.await })
        .await;

    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<AuthServiceServer<AuthServiceImpl>>()
        .await;
    health_reporter
        .set_serving::<UserServiceServer<UserServiceImpl>>()
        .await;
    health_reporter
        .set_serving::<JwtServiceServer<JwtServiceImpl>>()
        .await;

    info!(%addr, "IAM gRPC server listening");
    Server::builder()
        .http2_keepalive_interval(Some(Duration::from_secs(30)))
        .http2_keepalive_timeout(Some(Duration::from_secs(10)))
        .add_service(health_service)
        .add_service(AuthServiceServer::new(iam.auth_service()))
        .add_service(UserServiceServer::new(iam.user_service()))
        .add_service(JwtServiceServer::new(iam.jwt_service()))
        .serve_with_shutdown(addr, async {
            if let Err(e) = wait_for_signal().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
        })
        .await?;

    let _ = shutdown_tx.send(true);
    let report = closer.close_all(args.shutdown.timeout).await;
    info!(?report, "IAM stopped");
    Ok(())
}
