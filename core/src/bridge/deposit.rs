//! `DepositProof` (§3, §4.4): evidence that funds were locked on a
//! remote chain, carried by `source_tx_hash` + `block_number` + merkle
//! proof and attested to by a quorum of validator signatures before
//! `BridgeEngine` mints the wrapped side.
//!
//! Grounded on `bridge.h`'s `DepositProof`, trimmed of the unused
//! `merkle_proof` byte-vector field (the original never proved a chosen
//! encoding for it); merkle inclusion is re-derived from `spv::HeaderChain`
//! at verification time instead of trusted from the submitter.

use crate::bridge::validator::ValidatorSignature;
use crate::hash::Hash256;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DepositProof {
    pub source_tx_hash: Hash256,
    pub block_number: u64,
    pub depositor_address: Vec<u8>,
    pub recipient_address: Vec<u8>,
    pub amount: u64,
    pub token: String,
    pub validator_signatures: Vec<ValidatorSignature>,
    pub timestamp: u64,
}

impl DepositProof {
    /// Canonical signing payload: everything but the signatures
    /// themselves. Each validator signs this digest independently.
    pub fn signing_hash(&self) -> Hash256 {
        let mut buf = Vec::new();
        buf.extend_from_slice(self.source_tx_hash.as_bytes());
        buf.extend_from_slice(&self.block_number.to_le_bytes());
        buf.extend_from_slice(&self.depositor_address);
        buf.extend_from_slice(&self.recipient_address);
        buf.extend_from_slice(&self.amount.to_le_bytes());
        buf.extend_from_slice(self.token.as_bytes());
        buf.extend_from_slice(&self.timestamp.to_le_bytes());
        Hash256::hash_of(&buf)
    }
}
