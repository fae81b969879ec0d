//! JSON-RPC transport (§6): two `jsonrpsee` server traits, `bridge.*`
//! and `swap.*`, merged into one HTTP server by `bin/bridge_node.rs`
//! and `bin/swap_node.rs` respectively.

pub mod bridge_rpc;
pub mod swap_rpc;

pub use bridge_rpc::{BridgeInfo, BridgeRpcImpl, BridgeRpcServer, BridgeTransactions};
pub use swap_rpc::{SwapRpcImpl, SwapRpcServer};
