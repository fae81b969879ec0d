//! `WithdrawalRequest` (§3, §4.5): burns wrapped tokens on INTcoin and
//! pays out on the origin chain once a validator quorum signs off.
//!
//! Grounded on `bridge.h`'s `WithdrawalRequest` / `BridgeStatus`, trimmed
//! of the `requester_address` field (recovered from `requester_sig`
//! instead of carried redundantly) and `BridgeStatus::CONFIRMING`, which
//! has no counterpart once deposits are verified synchronously against
//! an already-quorate `DepositProof` rather than awaited over time.

use crate::bridge::validator::ValidatorSignature;
use crate::hash::Hash256;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WithdrawalStatus {
    Pending,
    Validated,
    Executed,
    Expired,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub withdrawal_id: String,
    pub requester: Vec<u8>,
    pub destination: Vec<u8>,
    pub amount: u64,
    pub token: String,
    pub bridge_fee: u64,
    pub status: WithdrawalStatus,
    pub validator_signatures: Vec<ValidatorSignature>,
    pub target_tx_hash: Option<Hash256>,
    pub created_at: u64,
    pub expires_at: u64,
}

impl WithdrawalRequest {
    /// `bridge_fee = amount * fee_basis_points / 10000` (§4.5 fee policy).
    /// The fee is deducted from the withdrawal amount; this returns what
    /// actually reaches `destination`.
    pub fn net_amount(&self) -> u64 {
        self.amount.saturating_sub(self.bridge_fee)
    }

    /// Canonical payload a validator signs off on: everything but the
    /// signatures themselves, mirroring `DepositProof::signing_hash`.
    pub fn signing_hash(&self) -> Hash256 {
        let mut buf = Vec::new();
        buf.extend_from_slice(self.withdrawal_id.as_bytes());
        buf.extend_from_slice(&self.destination);
        buf.extend_from_slice(&self.amount.to_le_bytes());
        buf.extend_from_slice(self.token.as_bytes());
        Hash256::hash_of(&buf)
    }
}

pub fn compute_bridge_fee(amount: u64, fee_basis_points: u32) -> u64 {
    ((amount as u128 * fee_basis_points as u128) / 10_000) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_is_basis_points_of_amount() {
        assert_eq!(compute_bridge_fee(20_000_000, 30), 60_000);
    }

    #[test]
    fn zero_fee_basis_points_yields_zero_fee() {
        assert_eq!(compute_bridge_fee(20_000_000, 0), 0);
    }

    #[test]
    fn net_amount_subtracts_fee() {
        let request = WithdrawalRequest {
            withdrawal_id: "w1".into(),
            requester: vec![],
            destination: vec![],
            amount: 1000,
            token: "wBTC".into(),
            bridge_fee: 3,
            status: WithdrawalStatus::Pending,
            validator_signatures: vec![],
            target_tx_hash: None,
            created_at: 0,
            expires_at: 0,
        };
        assert_eq!(request.net_amount(), 997);
    }
}
