//! The custody-free bridge (§4.4 Bridge Engine in spec terms, C5): wraps
//! deposits verified against a validator quorum into an INTcoin-side
//! ledger, and burns them back out on withdrawal. See `engine.rs` for
//! the `BridgeEngine` itself; the rest of this module is its data model.

pub mod deposit;
pub mod engine;
pub mod token;
pub mod validator;
pub mod withdrawal;

pub use deposit::DepositProof;
pub use engine::BridgeEngine;
pub use token::WrappedToken;
pub use validator::{Validator, ValidatorSignature};
pub use withdrawal::{WithdrawalRequest, WithdrawalStatus};
