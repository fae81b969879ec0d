//! Emits a starter `bridge.toml` with sane defaults, the way an operator
//! would hand-edit before their first deploy. Never overwrites an
//! existing file at the target path.

use clap::Parser;
use intcoin_bridge_core::config::{BridgeConfig, ChainRpcConfig, DatabaseConfig, MonitorConfig, SpvConfig};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "config-generator", about = "Generate a starter bridge.toml")]
struct Args {
    /// Where to write the generated config.
    #[arg(long, default_value = "bridge.toml")]
    out: PathBuf,
}

fn starter_config() -> BridgeConfig {
    let mut chains = BTreeMap::new();
    chains.insert(
        "bitcoin-testnet".to_string(),
        ChainRpcConfig {
            url: "http://127.0.0.1:18332".to_string(),
            user: "rpcuser".to_string(),
            password: "change-me".to_string(),
            poll_interval_seconds: 10,
        },
    );
    chains.insert(
        "intcoin-testnet".to_string(),
        ChainRpcConfig {
            url: "http://127.0.0.1:8332".to_string(),
            user: "rpcuser".to_string(),
            password: "change-me".to_string(),
            poll_interval_seconds: 2,
        },
    );

    BridgeConfig {
        min_validators: 2,
        total_validators: 3,
        min_confirmations_btc: 6,
        min_confirmations_eth: 12,
        min_confirmations_ltc: 12,
        fee_basis_points: 30,
        min_validator_stake: 1_000_000,
        withdrawal_timeout_seconds: 86_400,
        monitor: MonitorConfig::default(),
        spv: SpvConfig::default(),
        chains,
        database: DatabaseConfig {
            host: "localhost".to_string(),
            port: 5432,
            name: "intcoin_bridge".to_string(),
            user: "postgres".to_string(),
            password: "change-me".to_string(),
        },
        rpc_listen: "127.0.0.1:8545".to_string(),
    }
}

fn main() {
    let args = Args::parse();
    if args.out.exists() {
        eprintln!("refusing to overwrite existing file: {}", args.out.display());
        std::process::exit(1);
    }

    let config = starter_config();
    let toml = toml::to_string_pretty(&config).expect("starter config always serializes");
    std::fs::write(&args.out, toml).unwrap_or_else(|e| {
        eprintln!("failed to write {}: {e}", args.out.display());
        std::process::exit(1);
    });
    println!("wrote starter config to {}", args.out.display());
}
