//! INTcoin cross-chain core: SPV header tracking, HTLC-based atomic
//! swaps between INTcoin and a remote chain, and a custody-free
//! validator-quorum bridge for wrapped tokens.
//!
//! Module layout mirrors the six components this crate implements:
//! [`monitor`] (C1, chain events), [`spv`] (C2, header chain), [`htlc`]
//! (C3, script layer), [`swap`] (C4, atomic swap coordinator),
//! [`bridge`] (C5, bridge engine) and [`bridge_monitor`] (C6, bridge
//! watchdog). [`rpc`] exposes C4/C5 over JSON-RPC; [`db`] is the shared
//! persistence layer everything else is generic over.

pub mod bridge;
pub mod bridge_monitor;
pub mod chain;
pub mod config;
pub mod db;
pub mod errors;
pub mod hash;
pub mod htlc;
pub mod logging;
pub mod monitor;
pub mod rpc;
pub mod spv;
pub mod swap;

use crate::bridge::BridgeEngine;
use crate::bridge_monitor::BridgeMonitor;
use crate::config::BridgeConfig;
use crate::db::postgres::PostgresStore;
use crate::errors::BridgeResult;
use crate::spv::HeaderChain;
use crate::swap::AtomicSwapCoordinator;
use std::sync::Arc;

/// Everything a binary needs to run one or both of the bridge and swap
/// services, wired explicitly rather than through global statics (per
/// design note (9): every component gets exactly the dependencies it
/// needs, passed in at construction).
pub struct AppContext {
    pub config: BridgeConfig,
    pub store: Arc<PostgresStore>,
    pub bridge_engine: Arc<BridgeEngine<PostgresStore>>,
    pub bridge_monitor: Arc<BridgeMonitor<PostgresStore>>,
    pub swap_coordinator: Arc<AtomicSwapCoordinator<PostgresStore>>,
    pub header_chains: std::collections::HashMap<String, Arc<tokio::sync::Mutex<HeaderChain<PostgresStore>>>>,
}

impl AppContext {
    pub async fn new(config: BridgeConfig) -> BridgeResult<Self> {
        let store = Arc::new(PostgresStore::connect(&config.database).await?);
        let bridge_engine = Arc::new(BridgeEngine::new(Arc::clone(&store), config.clone())?);
        let bridge_monitor = Arc::new(BridgeMonitor::new(Arc::clone(&bridge_engine), config.monitor.clone()));
        let swap_coordinator = Arc::new(AtomicSwapCoordinator::new(Arc::clone(&store)));

        let checkpoints = config.spv.parsed_checkpoints()?;
        let mut header_chains = std::collections::HashMap::new();
        for chain_name in config.chains.keys() {
            header_chains.insert(
                chain_name.clone(),
                Arc::new(tokio::sync::Mutex::new(HeaderChain::new(chain_name.clone(), Arc::clone(&store), checkpoints.clone()))),
            );
        }

        Ok(AppContext {
            config,
            store,
            bridge_engine,
            bridge_monitor,
            swap_coordinator,
            header_chains,
        })
    }
}
