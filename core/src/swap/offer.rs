//! `SwapOffer` / `SwapState` / `SwapInfo` (§3, §4.4).

use crate::chain::ChainId;
use crate::hash::{HashAlgorithm, PaymentHash};
use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};

/// Safety buffer between the two legs' locktimes (§4.4).
pub const SAFETY_BUFFER_SECONDS: u64 = 24 * 3600;

/// Deadline (relative to `participant_locktime`) past which the initiator
/// failing to fund auto-fails the offer (§4.4 tie-breaking rule).
pub const INITIATOR_FUND_DEADLINE_SECONDS: u64 = 48 * 3600;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Initiator,
    Participant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapState {
    OfferCreated,
    OfferAccepted,
    ParticipantHtlcFunded,
    InitiatorHtlcFunded,
    InitiatorClaimed,
    ParticipantClaimed,
    Completed,
    Refunded,
    Failed,
    Expired,
}

impl SwapState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SwapState::Completed | SwapState::Refunded | SwapState::Failed | SwapState::Expired)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SwapOffer {
    pub swap_id: String,
    pub initiator_chain: ChainId,
    pub participant_chain: ChainId,
    pub initiator_amount: u64,
    pub participant_amount: u64,
    pub payment_hash: PaymentHash,
    pub hash_algorithm: HashAlgorithm,
    pub initiator_pubkey: PublicKey,
    pub participant_pubkey: Option<PublicKey>,
    pub initiator_locktime: u64,
    pub participant_locktime: u64,
    pub created_at: u64,
    pub expires_at: u64,
}

impl SwapOffer {
    /// Invariant 3 (§8): `initiator_locktime - participant_locktime >= 24h`.
    pub fn satisfies_safety_buffer(&self) -> bool {
        self.initiator_locktime >= self.participant_locktime
            && self.initiator_locktime - self.participant_locktime >= SAFETY_BUFFER_SECONDS
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SwapInfo {
    pub offer: SwapOffer,
    pub state: SwapState,
    pub role: Role,
    pub failure_reason: Option<String>,
}
