//! Rocket Factory assembly worker

use std::sync::Arc;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};

use rocket_core::Closer;
use rocket_core::bus::{EventLog, GroupConsumer, LogProducer};
use rocket_core::closer::wait_for_signal;
use rocket_core::config::{BusArgs, LoggerArgs, ShutdownArgs, TopicArgs};
use rocket_core::tracing_init::init_tracing;

use rocket_assembly::config::AssemblyArgs;
use rocket_assembly::worker::AssemblyHandler;

#[derive(Parser, Debug)]
#[command(name = "rocket-assembly")]
#[command(version, about = "Rocket Factory assembly worker")]
struct Args {
    #[command(flatten)]
    logger: LoggerArgs,

    #[command(flatten)]
    bus: BusArgs,

    #[command(flatten)]
    topics: TopicArgs,

    #[command(flatten)]
    assembly: AssemblyArgs,

    #[command(flatten)]
    shutdown: ShutdownArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing("rocket_assembly", &args.logger);
    args.assembly.validate().map_err(anyhow::Error::msg)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting rocket-assembly");

    let closer = Closer::new();
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

    let producer = LogProducer::new(log.clone(), args.bus.producer_config())?;
    let handler = AssemblyHandler::new(
        Arc::new(producer),
        args.topics.ship_assembled.clone(),
        args.assembly.min_build_secs..=args.assembly.max_build_secs,
    );
    let consumer = GroupConsumer::new(
        log,
        args.bus
            .consumer_config(&args.topics.assembly_group, &args.topics.order_paid),
        Arc::new(handler),
    )?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer_task = tokio::spawn(consumer.run(shutdown_rx));
    closer
        .add("order-paid-consumer", move || async move {
            let _ = shutdown_tx.send(true);
            consumer_task.await
        })
        .await;

    if let Err(e) = wait_for_signal().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }

    let report = closer.close_all(args.shutdown.timeout).await;
    info!(?report, "Assembly stopped");
    Ok(())
}
