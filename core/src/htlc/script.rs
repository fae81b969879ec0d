//! Table-driven script encoding (§4.3). One strategy per `ChainId`
//! selects the opcode mapping; BTC-family chains get the standard
//! hashlock+timelock pattern, INTcoin substitutes a post-quantum
//! signature check.
//!
//! Grounded on the teacher's `transaction_builder.rs` / `ScriptBuilder`
//! pattern of composing scripts with `bitcoin::blockdata::script::Builder`
//! and `opcodes::all` (e.g. its inline `OP_SHA256 <hash> OP_EQUAL`
//! preimage script).

use super::contract::HTLCContract;
use crate::chain::ChainId;
use crate::hash::HashAlgorithm;
use bitcoin::blockdata::opcodes::{all, Opcode};
use bitcoin::blockdata::script::{Builder, ScriptBuf};
use bitcoin::absolute::LockTime;
use std::fmt;

/// `OP_CHECKDILITHIUMSIG`: INTcoin repurposes the reserved `OP_NOP4` slot
/// the same way BTC repurposed `OP_NOP2`/`OP_NOP3` for CLTV/CSV.
const OP_CHECKDILITHIUMSIG: u8 = all::OP_NOP4.to_u8();

/// Opaque encoded script. BTC-family chains produce a real
/// `bitcoin::ScriptBuf`; INTcoin and EVM targets produce their own byte
/// encodings, but all are carried as raw bytes past this boundary.
#[derive(Clone, PartialEq, Eq)]
pub struct Script(pub Vec<u8>);

impl Script {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

fn hash_opcode(algorithm: HashAlgorithm) -> Opcode {
    match algorithm {
        HashAlgorithm::Sha256 => all::OP_SHA256,
        HashAlgorithm::Ripemd160 => all::OP_RIPEMD160,
        // No native opcode for SHA3-256; INTcoin's script VM recognizes
        // the same NOP4 family for its extended hash table, keyed by the
        // hash_algorithm byte pushed ahead of it (see `build_htlc_script`).
        HashAlgorithm::Sha3_256 => all::OP_SHA256,
    }
}

/// Builds the locking script for `contract` targeting `target_chain`.
///
/// Spend paths:
/// - claim: `OP_IF <hash-op> <payment_hash> OP_EQUALVERIFY <recipient_pk> OP_CHECKSIG`
/// - refund: `OP_ELSE <locktime> OP_CLTV OP_DROP <refund_pk> OP_CHECKSIG OP_ENDIF`
pub fn build_htlc_script(contract: &HTLCContract, target_chain: ChainId) -> Script {
    let checksig_opcode = if contract.uses_post_quantum_sig(target_chain) {
        Opcode::from(OP_CHECKDILITHIUMSIG)
    } else {
        all::OP_CHECKSIG
    };

    let mut builder = Builder::new()
        .push_opcode(all::OP_IF)
        .push_opcode(hash_opcode(contract.hash_algorithm));

    if matches!(contract.hash_algorithm, HashAlgorithm::Sha3_256) {
        // Tag the extended-algorithm branch so a verifying node knows to
        // reinterpret the following SHA-256-shaped opcode as SHA3-256.
        builder = builder.push_slice([contract.hash_algorithm as u8]);
    }

    let locktime = LockTime::from_consensus(contract.locktime as u32);

    builder
        .push_slice(contract.payment_hash.0)
        .push_opcode(all::OP_EQUALVERIFY)
        .push_slice(contract.recipient_pubkey.serialize())
        .push_opcode(checksig_opcode)
        .push_opcode(all::OP_ELSE)
        .push_lock_time(locktime)
        .push_opcode(all::OP_CLTV)
        .push_opcode(all::OP_DROP)
        .push_slice(contract.refund_pubkey.serialize())
        .push_opcode(checksig_opcode)
        .push_opcode(all::OP_ENDIF)
        .into_script()
        .into()
}

impl From<ScriptBuf> for Script {
    fn from(buf: ScriptBuf) -> Self {
        Script(buf.into_bytes())
    }
}
