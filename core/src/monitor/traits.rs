//! C1's public contract (§4.1) and the events it emits. `ChainMonitor` is
//! the trait/interface design-note (9) calls for in place of dynamic
//! dispatch over BTC/LTC/ETH flavors: one implementation selected at
//! startup from `ChainId`.

use crate::errors::BridgeResult;
use crate::hash::{Hash256, HashAlgorithm, PaymentHash, Preimage};
use async_trait::async_trait;
use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ChainEvent {
    HtlcFunded {
        payment_hash: PaymentHash,
        tx_hash: Hash256,
        vout: u32,
        amount: u64,
        script: Vec<u8>,
        confirmations: u64,
    },
    HtlcSpent {
        payment_hash: PaymentHash,
        tx_hash: Hash256,
        vout: u32,
        preimage: Option<Preimage>,
    },
    NewBlock {
        height: u64,
        hash: Hash256,
    },
}

#[derive(Clone, Debug)]
pub struct HtlcWatch {
    pub payment_hash: PaymentHash,
    pub hash_algorithm: HashAlgorithm,
    pub recipient_pubkey: PublicKey,
    pub refund_pubkey: PublicKey,
    pub locktime: u64,
}

/// Per-chain async feed: detect HTLC funding/spend and new blocks, and
/// answer liveness questions about specific transactions. One
/// implementation is constructed per watched chain (§9 design notes).
#[async_trait]
pub trait ChainMonitor: Send + Sync {
    /// Registers interest in a payment_hash. Idempotent: watching twice
    /// with the same payment_hash is a no-op.
    async fn watch_htlc(&self, watch: HtlcWatch) -> BridgeResult<()>;

    async fn stop_watching(&self, payment_hash: PaymentHash) -> BridgeResult<()>;

    async fn get_current_height(&self) -> BridgeResult<u64>;

    async fn get_confirmations(&self, tx_hash: Hash256) -> BridgeResult<u64>;

    async fn is_spent(&self, tx_hash: Hash256, vout: u32) -> BridgeResult<bool>;

    async fn broadcast_transaction(&self, raw_hex: &str) -> BridgeResult<Hash256>;

    /// Hands the caller the receiving end of this monitor's event queue.
    /// Only one receiver is ever handed out; a second call returns `None`.
    fn take_event_receiver(&self) -> Option<tokio::sync::mpsc::Receiver<ChainEvent>>;
}
