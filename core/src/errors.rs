//! Error taxonomy. One variant per §7 error kind, plus the structural
//! errors a database- and RPC-backed service accumulates. Modeled on the
//! teacher's `BridgeError` (a flat `thiserror` enum covering both protocol
//! and infrastructure failures).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// Missing or invalid configuration. Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transient remote-chain RPC failure; caller's retry policy applies.
    #[error("network/RPC error: {0}")]
    Network(String),

    /// Deposit proof failed signature, quorum, or replay checks.
    #[error("deposit proof invalid: {0}")]
    ProofInvalid(String),

    /// Not an error per se — returned as a status when more signatures
    /// are required.
    #[error("quorum not met: have {have}, need {need}")]
    QuorumNotMet { have: usize, need: usize },

    /// Withdrawal denied synchronously for lack of funds.
    #[error("insufficient balance: have {have}, requested {requested}")]
    InsufficientBalance { have: u64, requested: u64 },

    /// Emergency pause blocks all mutating bridge operations.
    #[error("bridge is paused")]
    Paused,

    /// Withdrawal or swap past its timeout.
    #[error("expired: {0}")]
    Expired(String),

    /// Internal invariant broken (e.g. supply mismatch). Fatal: the
    /// caller must pause and require operator acknowledgment.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// SPV rejected a header or reorg; local tip unchanged.
    #[error("chain consistency error: {0}")]
    ChainConsistency(String),

    #[error("token not registered: {0}")]
    TokenNotRegistered(String),

    #[error("token already registered: {0}")]
    TokenAlreadyRegistered(String),

    #[error("validator not found or inactive")]
    ValidatorNotActive,

    #[error("validator already registered")]
    ValidatorAlreadyExists,

    #[error("deposit proof not found")]
    ProofNotFound,

    #[error("deposit proof already submitted (replay)")]
    ProofReplay,

    #[error("withdrawal not found")]
    WithdrawalNotFound,

    #[error("swap offer not found")]
    SwapNotFound,

    #[error("swap offer in unexpected state: {0}")]
    InvalidSwapState(String),

    #[error("header chain error: {0}")]
    HeaderRejected(String),

    #[error("withdrawal not in a state that allows this action: {0}")]
    InvalidWithdrawalState(String),

    #[error("signature error: {0}")]
    Signature(#[from] secp256k1::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("bitcoin RPC error: {0}")]
    BitcoinRpc(#[from] bitcoincore_rpc::Error),

    #[error("hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl BridgeError {
    /// Stable machine-readable code for RPC responses. Semantic errors get
    /// verbatim codes; everything else collapses to a generic bucket so
    /// internal detail (paths, stack traces) never reaches a caller.
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::Config(_) => "config",
            BridgeError::Network(_) | BridgeError::BitcoinRpc(_) => "network",
            BridgeError::ProofInvalid(_) | BridgeError::ProofReplay => "proof_invalid",
            BridgeError::QuorumNotMet { .. } => "quorum_not_met",
            BridgeError::InsufficientBalance { .. } => "insufficient_balance",
            BridgeError::Paused => "paused",
            BridgeError::Expired(_) => "expired",
            BridgeError::InvariantViolation(_) => "invariant_violation",
            BridgeError::ChainConsistency(_) => "chain_consistency",
            _ => "internal",
        }
    }
}

pub type BridgeResult<T> = Result<T, BridgeError>;

/// `jsonrpsee` server methods need their errors converted into
/// `ErrorObjectOwned`. Semantic errors are surfaced with their stable
/// code and message; everything else is sanitized to a generic message
/// so file paths / internal detail never leak to an RPC caller (§7).
impl From<BridgeError> for jsonrpsee::types::ErrorObjectOwned {
    fn from(err: BridgeError) -> Self {
        let code = err.code();
        let message = match &err {
            BridgeError::Config(_)
            | BridgeError::Network(_)
            | BridgeError::ProofInvalid(_)
            | BridgeError::QuorumNotMet { .. }
            | BridgeError::InsufficientBalance { .. }
            | BridgeError::Paused
            | BridgeError::Expired(_)
            | BridgeError::InvariantViolation(_)
            | BridgeError::ChainConsistency(_)
            | BridgeError::TokenNotRegistered(_)
            | BridgeError::TokenAlreadyRegistered(_)
            | BridgeError::ValidatorNotActive
            | BridgeError::ValidatorAlreadyExists
            | BridgeError::ProofNotFound
            | BridgeError::ProofReplay
            | BridgeError::WithdrawalNotFound
            | BridgeError::SwapNotFound
            | BridgeError::InvalidSwapState(_)
            | BridgeError::HeaderRejected(_)
            | BridgeError::InvalidWithdrawalState(_) => err.to_string(),
            _ => "internal error".to_string(),
        };
        jsonrpsee::types::ErrorObjectOwned::owned(
            jsonrpsee::types::error::ErrorCode::ServerError(1).code(),
            format!("{code}: {message}"),
            None::<()>,
        )
    }
}
