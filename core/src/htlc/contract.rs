//! `HTLCContract` (§3, §4.3): the chain-agnostic description of a
//! hash-and-timelock spending condition. `script::build_htlc_script`
//! turns one of these into the actual per-chain encoding.

use crate::chain::ChainId;
use crate::hash::{HashAlgorithm, PaymentHash};
use crate::spv::LocktimeKind;
use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HTLCContract {
    pub recipient_pubkey: PublicKey,
    pub refund_pubkey: PublicKey,
    pub payment_hash: PaymentHash,
    pub hash_algorithm: HashAlgorithm,
    pub locktime: u64,
    pub locktime_kind: LocktimeKind,
}

impl HTLCContract {
    pub fn new(
        recipient_pubkey: PublicKey,
        refund_pubkey: PublicKey,
        payment_hash: PaymentHash,
        hash_algorithm: HashAlgorithm,
        locktime: u64,
        locktime_kind: LocktimeKind,
    ) -> Self {
        HTLCContract {
            recipient_pubkey,
            refund_pubkey,
            payment_hash,
            hash_algorithm,
            locktime,
            locktime_kind,
        }
    }

    /// Whether `target_chain` should use INTcoin's post-quantum opcode
    /// table instead of the BTC-family ECDSA one (§4.3).
    pub fn uses_post_quantum_sig(&self, target_chain: ChainId) -> bool {
        matches!(target_chain, ChainId::Intcoin { .. })
    }
}
