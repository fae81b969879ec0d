//! Tracing setup. One call from each binary's `main`, matching the
//! teacher's `tracing-subscriber` dependency and its direct
//! `tracing::debug!`/`info!` call sites throughout `db/common.rs`.

use tracing_subscriber::EnvFilter;

/// Initializes the global `tracing` subscriber. Respects `RUST_LOG`;
/// defaults to `info` for this crate and `warn` for dependencies.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,intcoin_bridge_core=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
