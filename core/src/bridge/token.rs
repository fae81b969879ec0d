//! `WrappedToken` (§3): identity is `symbol`; supply is a strictly
//! monotonic function of cumulative mint minus burn, enforced by
//! `BridgeEngine` rather than this type itself.
//!
//! Grounded on the original `WrappedToken` struct (`bridge.h`), trimmed
//! of its on-chain `contract_id`/`origin_address` fields which have no
//! counterpart once custody-free proof verification replaces an actual
//! smart-contract deployment.

use crate::chain::ChainId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedToken {
    pub symbol: String,
    pub origin_chain: ChainId,
    pub decimals: u8,
    pub total_supply: u64,
}

impl WrappedToken {
    pub fn new(symbol: impl Into<String>, origin_chain: ChainId, decimals: u8) -> Self {
        WrappedToken {
            symbol: symbol.into(),
            origin_chain,
            decimals,
            total_supply: 0,
        }
    }
}
