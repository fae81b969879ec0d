//! Long-running bridge node: wires the bridge engine and its monitor to
//! a JSON-RPC server and a fixed-interval health-check ticker. One
//! process per deployment (§6); the swap side runs separately as
//! `swap_node`.

use clap::Parser;
use intcoin_bridge_core::config::Cli;
use intcoin_bridge_core::errors::BridgeResult;
use intcoin_bridge_core::logging::init_tracing;
use intcoin_bridge_core::rpc::{BridgeRpcImpl, BridgeRpcServer};
use intcoin_bridge_core::AppContext;
use jsonrpsee::server::ServerBuilder;
use std::time::Duration;

const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(300);
const EXPIRATION_CHECK_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> BridgeResult<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = cli.load_config()?;
    let listen = config.rpc_listen.clone();

    let ctx = AppContext::new(config).await?;
    if cli.start_paused {
        ctx.bridge_engine.emergency_pause().await;
    }

    let rpc_impl = BridgeRpcImpl {
        engine: ctx.bridge_engine.clone(),
        monitor: ctx.bridge_monitor.clone(),
    };
    let server = ServerBuilder::default()
        .build(listen.clone())
        .await
        .map_err(|e| intcoin_bridge_core::errors::BridgeError::Config(format!("cannot bind {listen}: {e}")))?;
    let handle = server.start(rpc_impl.into_rpc());
    tracing::info!(%listen, "bridge node RPC server listening");

    let monitor = ctx.bridge_monitor.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(HEALTH_CHECK_INTERVAL);
        loop {
            ticker.tick().await;
            if let Err(e) = monitor.run_health_check().await {
                tracing::error!(error = %e, "bridge monitor health check failed");
            }
        }
    });

    let engine = ctx.bridge_engine.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(EXPIRATION_CHECK_INTERVAL);
        loop {
            ticker.tick().await;
            if let Err(e) = engine.check_expirations().await {
                tracing::error!(error = %e, "bridge withdrawal expiration sweep failed");
            }
        }
    });

    tokio::signal::ctrl_c().await.ok();
    tracing::info!("bridge node shutting down");
    handle.stop().ok();
    Ok(())
}
