//! Chain identity. Immutable tagged enum over the chains this node ever
//! talks to, each with a mainnet/testnet distinction (mirrors the
//! `BridgeChain` enum the original bridge module keyed its tables on).

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainId {
    Intcoin { testnet: bool },
    Bitcoin { testnet: bool },
    Litecoin { testnet: bool },
    Ethereum { testnet: bool },
}

impl ChainId {
    pub fn is_testnet(&self) -> bool {
        match self {
            ChainId::Intcoin { testnet }
            | ChainId::Bitcoin { testnet }
            | ChainId::Litecoin { testnet }
            | ChainId::Ethereum { testnet } => *testnet,
        }
    }

    /// Expected reorg depth to scan back over when polling, per §4.1: 6 for
    /// BTC, 12 for ETH and LTC.
    pub fn reorg_scan_depth(&self) -> u32 {
        match self {
            ChainId::Bitcoin { .. } => 6,
            ChainId::Litecoin { .. } | ChainId::Ethereum { .. } => 12,
            ChainId::Intcoin { .. } => 6,
        }
    }

    /// Default poll interval in seconds: 10s for BTC-family, faster for
    /// INTcoin itself (§4.1).
    pub fn default_poll_interval_secs(&self) -> u64 {
        match self {
            ChainId::Intcoin { .. } => 2,
            _ => 10,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChainId::Intcoin { testnet: false } => "intcoin",
            ChainId::Intcoin { testnet: true } => "intcoin-testnet",
            ChainId::Bitcoin { testnet: false } => "bitcoin",
            ChainId::Bitcoin { testnet: true } => "bitcoin-testnet",
            ChainId::Litecoin { testnet: false } => "litecoin",
            ChainId::Litecoin { testnet: true } => "litecoin-testnet",
            ChainId::Ethereum { testnet: false } => "ethereum",
            ChainId::Ethereum { testnet: true } => "ethereum-testnet",
        }
    }

    /// Inverse of [`ChainId::name`], used to resolve the string keys of
    /// `BridgeConfig::chains` at node startup.
    pub fn from_name(name: &str) -> Option<ChainId> {
        Some(match name {
            "intcoin" => ChainId::Intcoin { testnet: false },
            "intcoin-testnet" => ChainId::Intcoin { testnet: true },
            "bitcoin" => ChainId::Bitcoin { testnet: false },
            "bitcoin-testnet" => ChainId::Bitcoin { testnet: true },
            "litecoin" => ChainId::Litecoin { testnet: false },
            "litecoin-testnet" => ChainId::Litecoin { testnet: true },
            "ethereum" => ChainId::Ethereum { testnet: false },
            "ethereum-testnet" => ChainId::Ethereum { testnet: true },
            _ => return None,
        })
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 20-byte address on an EVM chain, kept as an opaque wrapper the way the
/// teacher's `EVMAddress` did — callers that need checksum formatting or
/// ABI encoding build it elsewhere; this type is just an identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvmAddress(pub [u8; 20]);

impl fmt::Debug for EvmAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for EvmAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}
