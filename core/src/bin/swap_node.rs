//! Long-running swap node: wires a `PollingChainMonitor` per configured
//! chain, forwards their events into the atomic swap coordinator, and
//! exposes the `swap.*` JSON-RPC surface. Runs independently of
//! `bridge_node` (§6: separate processes, shared `Store`).

use clap::Parser;
use intcoin_bridge_core::chain::ChainId;
use intcoin_bridge_core::config::Cli;
use intcoin_bridge_core::db::postgres::PostgresStore;
use intcoin_bridge_core::errors::{BridgeError, BridgeResult};
use intcoin_bridge_core::logging::init_tracing;
use intcoin_bridge_core::monitor::{connect_for_chain, ChainMonitor, PollingChainMonitor};
use intcoin_bridge_core::rpc::{SwapRpcImpl, SwapRpcServer};
use intcoin_bridge_core::swap::{spawn_event_forwarding, spawn_timeout_ticker, AtomicSwapCoordinator};
use jsonrpsee::server::ServerBuilder;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> BridgeResult<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = cli.load_config()?;
    let listen = config.rpc_listen.clone();

    let store = Arc::new(PostgresStore::connect(&config.database).await?);
    let coordinator = Arc::new(AtomicSwapCoordinator::new(Arc::clone(&store)));

    let mut monitors: Vec<(ChainId, Arc<dyn ChainMonitor>)> = Vec::new();
    for (name, rpc_config) in &config.chains {
        let chain = ChainId::from_name(name).ok_or_else(|| BridgeError::Config(format!("unknown chain name {name}")))?;
        let rpc = Arc::from(connect_for_chain(chain, rpc_config)?);
        let poll_interval = Duration::from_secs(rpc_config.poll_interval_seconds.max(1));
        let monitor = PollingChainMonitor::new(chain, rpc, poll_interval);
        monitor.spawn();
        monitors.push((chain, monitor as Arc<dyn ChainMonitor>));
    }

    spawn_event_forwarding(monitors, Arc::clone(&coordinator));
    spawn_timeout_ticker(Arc::clone(&coordinator));

    let rpc_impl = SwapRpcImpl { coordinator: Arc::clone(&coordinator) };
    let server = ServerBuilder::default()
        .build(listen.clone())
        .await
        .map_err(|e| BridgeError::Config(format!("cannot bind {listen}: {e}")))?;
    let handle = server.start(rpc_impl.into_rpc());
    tracing::info!(%listen, "swap node RPC server listening");

    tokio::signal::ctrl_c().await.ok();
    tracing::info!("swap node shutting down");
    handle.stop().ok();
    Ok(())
}
