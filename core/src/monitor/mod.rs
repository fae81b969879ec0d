//! C1: chain monitor. Polling-based `ChainMonitor` implementations over
//! a small `RemoteChainRpc` trait, selected per `ChainId` at startup.

pub mod poller;
pub mod rpc_client;
pub mod traits;

pub use poller::PollingChainMonitor;
pub use rpc_client::{connect_for_chain, RemoteChainRpc};
pub use traits::{ChainEvent, ChainMonitor, HtlcWatch};
