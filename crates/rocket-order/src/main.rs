//! Rocket Factory order server

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};

use rocket_core::Closer;
use rocket_core::bus::{EventLog, GroupConsumer, LogProducer};
use rocket_core::closer::wait_for_signal;
use rocket_core::config::{BusArgs, DatabaseArgs, HttpArgs, LoggerArgs, ShutdownArgs, TopicArgs};
use rocket_core::tracing_init::init_tracing;

use rocket_order::clients::{GrpcIamClient, GrpcInventoryClient, GrpcPaymentClient};
use rocket_order::config::{ApiArgs, ClientArgs, OutboxArgs};
use rocket_order::events::{OrderEventPublisher, OutboxRelay, ShipAssembledHandler};
use rocket_order::http::{AppState, Timeouts, router};
use rocket_order::service::OrderService;
use rocket_order::storage::OrderDatabase;

#[derive(Parser, Debug)]
#[command(name = "rocket-order")]
#[command(version, about = "Rocket Factory order service - order lifecycle and HTTP API")]
struct Args {
    #[command(flatten)]
    logger: LoggerArgs,

    #[command(flatten)]
    http: HttpArgs,

    #[command(flatten)]
    api: ApiArgs,

    #[command(flatten)]
    database: DatabaseArgs,

    #[command(flatten)]
    bus: BusArgs,

    #[command(flatten)]
    topics: TopicArgs,

    #[command(flatten)]
    clients: ClientArgs,

    #[command(flatten)]
    outbox: OutboxArgs,

    #[command(flatten)]
    shutdown: ShutdownArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing("rocket_order", &args.logger);

    let addr = args.http.addr();
    info!(version = env!("CARGO_PKG_VERSION"), %addr, "Starting rocket-order");

    let closer = Closer::new();
    let db = OrderDatabase::open(&args.database.path, args.database.max_connections).await?;
    {
        let db = db.clone();
        closer
            .add("order-database", move || async move {
                db.close().await;
                Ok::<(), String>(())
            })
            .await;
    }

    let log = EventLog::open(&args.bus.path, 4).await?;
    {
        let log = log.clone();
        closer
            .add("event-log", move || async move {
                log.close().await;
                Ok::<(), String>(())
            })
            .await;
    }

    let timeout = args.clients.timeout;
    let inventory = GrpcInventoryClient::connect_lazy(&args.clients.inventory_addr, timeout)?;
    let payments = GrpcPaymentClient::connect_lazy(&args.clients.payment_addr, timeout)?;
    let iam = GrpcIamClient::connect_lazy(&args.clients.iam_addr, timeout)?;

    let producer = Arc::new(LogProducer::new(log.clone(), args.bus.producer_config())?);
    let outbox = Arc::new(db.clone());
    let events = OrderEventPublisher::new(
        producer.clone(),
        outbox.clone(),
        args.topics.order_paid.clone(),
    );
    let orders = Arc::new(OrderService::new(
        Arc::new(db),
        Arc::new(inventory),
        Arc::new(payments),
        events,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let consumer = GroupConsumer::new(
        log,
        args.bus
            .consumer_config(&args.topics.order_group, &args.topics.ship_assembled),
        Arc::new(ShipAssembledHandler::new(orders.clone())),
    )?;
    let consumer_task = tokio::spawn(consumer.run(shutdown_rx.clone()));
    closer
        .add("ship-assembled-consumer", move || async move {
            consumer_task.await
        })
        .await;

    let relay = OutboxRelay::new(outbox, producer, args.outbox.batch_size)
        .spawn(args.outbox.relay_interval, shutdown_rx.clone());
    closer
        .add("outbox-relay", move || async move { relay.await })
        .await;

    let app = router(
        AppState {
            orders,
            iam: Arc::new(iam),
        },
        Timeouts {
            read: args.http.read_header_timeout,
            request: args.api.request_timeout,
        },
    );

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Order HTTP server listening");

    let mut server_rx = shutdown_rx;
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = server_rx.wait_for(|stop| *stop).await;
            })
            .await
    });

    if let Err(e) = wait_for_signal().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    let _ = shutdown_tx.send(true);

    match tokio::time::timeout(args.http.shutdown_timeout, server).await {
        Ok(Ok(Ok(()))) => info!("HTTP server drained"),
        Ok(Ok(Err(e))) => error!(error = %e, "HTTP server failed"),
        Ok(Err(e)) => error!(error = %e, "HTTP server task panicked"),
        Err(_) => warn!(
            timeout = ?args.http.shutdown_timeout,
            "HTTP server did not drain in time"
        ),
    }

    let report = closer.close_all(args.shutdown.timeout).await;
    info!(?report, "Order service stopped");
    Ok(())
}
