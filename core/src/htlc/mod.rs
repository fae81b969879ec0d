//! C3: HTLC script layer. Chain-agnostic contract description plus
//! table-driven per-chain script/witness encoding.

pub mod contract;
pub mod script;
pub mod witness;

pub use contract::HTLCContract;
pub use script::{build_htlc_script, Script};
pub use witness::{build_claim_witness, build_refund_witness, Witness};
