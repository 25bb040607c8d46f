mod config;
mod replay;

use anyhow::{Context as _, Result};
use block_sync::{
    BlockNodeInformation, BlockProcessor, BlockStore, BlockSyncService, ChainMessage,
    ChainMessageSink,
};
use clap::Parser;
use config::NodeConfig;
use fork_choice::get_forkchoice_store;
use metrics::server::{run_metrics_server, MetricsServerConfig};
use metrics::Metrics;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::{sync::mpsc, task};
use tracing::{error, info};

#[derive(Parser, Debug)]
struct Args {
    /// Node configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Recorded block deliveries to feed through the sync service (YAML)
    #[arg(short, long)]
    replay: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    metrics: bool,

    #[arg(long, default_value = "127.0.0.1")]
    metrics_address: IpAddr,

    #[arg(long, default_value_t = 9100)]
    metrics_port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => NodeConfig::load(path)?,
        None => NodeConfig::default(),
    };

    let genesis = config.genesis.block();
    let store = get_forkchoice_store(genesis.clone(), config.fork_choice.rule())
        .context("configured genesis is not a valid genesis block")?;
    info!(
        hash = %genesis.hash(),
        fork_choice = ?config.fork_choice,
        "Initialized chain from genesis"
    );

    let node_information = Arc::new(BlockNodeInformation::with_max_blocks(
        config.sync.max_known_blocks,
    ));
    let mut service =
        BlockSyncService::new(BlockStore::new(), store, node_information, config.sync.clone());

    if args.metrics {
        let metrics = Arc::new(Metrics::new().context("failed to register metrics")?);
        service = service.with_metrics(Arc::clone(&metrics));

        let server_config = MetricsServerConfig {
            metrics_address: args.metrics_address,
            metrics_port: args.metrics_port,
        };
        task::spawn(async move {
            if let Err(err) = run_metrics_server(server_config, metrics).await {
                error!(error = %err, "Metrics server exited");
            }
        });
    }

    let service = Arc::new(service);
    let (chain_message_sender, chain_message_receiver) = mpsc::unbounded_channel::<ChainMessage>();
    let mut processor = BlockProcessor::new(Arc::clone(&service), chain_message_receiver);
    let processor_handle = task::spawn(async move { processor.start().await });

    let Some(replay_path) = &args.replay else {
        info!("No replay file given, waiting for shutdown");
        tokio::signal::ctrl_c().await?;
        return Ok(());
    };

    let deliveries = replay::load_deliveries(replay_path)?;
    info!(
        deliveries = deliveries.len(),
        path = %replay_path.display(),
        "Replaying block deliveries"
    );
    for delivery in deliveries {
        ChainMessageSink::send(&chain_message_sender, delivery.into_message()?).await?;
    }
    drop(chain_message_sender);

    let processor_stats = processor_handle
        .await
        .context("block processor task failed")??;
    let stats = service.get_stats();
    info!(
        best_number = stats.best_number.0,
        best_hash = %stats.best_hash,
        pending = stats.pending_blocks,
        connected = stats.connected_blocks,
        evicted = stats.evicted_blocks,
        rejected = processor_stats.rejected,
        "Replay finished"
    );

    if args.metrics {
        info!("Serving metrics until shutdown");
        tokio::signal::ctrl_c().await?;
    }

    Ok(())
}
