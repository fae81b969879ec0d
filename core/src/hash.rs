//! 32-byte digests and the hash-algorithm taxonomy HTLCs are built against.

use ripemd::Ripemd160;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sha3::Sha3_256;
use std::fmt;

/// Opaque 32-byte digest. Stored little-endian internally (matching the
/// remote chains' in-memory txid/block-hash convention); displayed
/// big-endian in hex, the way block explorers show them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    pub const ZERO: Hash256 = Hash256([0u8; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Hash256(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        let mut reversed = self.0;
        reversed.reverse();
        hex::encode(reversed)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        bytes.reverse();
        Ok(Hash256(bytes))
    }

    /// Double-SHA256, the digest used for block and transaction identity
    /// across the BTC-family chains this node watches.
    pub fn hash_of(data: &[u8]) -> Self {
        let first = Sha256::digest(data);
        let second = Sha256::digest(first);
        let mut out = [0u8; 32];
        out.copy_from_slice(&second);
        Hash256(out)
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", self.to_hex())
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Hash algorithm taxonomy an `HTLCContract` may be built against. The
/// algorithm is part of the contract: claim and verify must agree on it or
/// the preimage will silently fail to unlock the script.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashAlgorithm {
    Sha256,
    Ripemd160,
    Sha3_256,
}

/// 32 bytes of secret entropy. Knowing it proves right-to-claim an HTLC.
/// Must never be reused across swaps — see `swap::offer::SwapOffer`.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preimage(pub [u8; 32]);

impl Preimage {
    pub fn generate() -> Self {
        use secp256k1::rand::RngCore;
        let mut bytes = [0u8; 32];
        secp256k1::rand::thread_rng().fill_bytes(&mut bytes);
        Preimage(bytes)
    }

    /// Hashes this preimage under `algorithm`, producing the `PaymentHash`
    /// that goes into an `HTLCContract`. RIPEMD-160 output is left-padded
    /// into the 32-byte digest with zeros in the high bytes so the
    /// `PaymentHash` type stays uniform across algorithms.
    pub fn hash_with(&self, algorithm: HashAlgorithm) -> PaymentHash {
        match algorithm {
            HashAlgorithm::Sha256 => {
                let digest = Sha256::digest(self.0);
                let mut out = [0u8; 32];
                out.copy_from_slice(&digest);
                PaymentHash(out)
            }
            HashAlgorithm::Sha3_256 => {
                let digest = Sha3_256::digest(self.0);
                let mut out = [0u8; 32];
                out.copy_from_slice(&digest);
                PaymentHash(out)
            }
            HashAlgorithm::Ripemd160 => {
                let digest = Ripemd160::digest(self.0);
                let mut out = [0u8; 32];
                out[12..].copy_from_slice(&digest);
                PaymentHash(out)
            }
        }
    }
}

impl fmt::Debug for Preimage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Preimage(<redacted>)")
    }
}

/// `H(preimage)` under a chosen `HashAlgorithm`. Shared verbatim between a
/// swap's initiator-chain and participant-chain HTLCs (spec invariant 2).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentHash(pub [u8; 32]);

impl fmt::Debug for PaymentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PaymentHash({})", hex::encode(self.0))
    }
}

/// Hashes `preimage` under `algorithm`. Thin free function mirroring the
/// contract in spec §4.3 (`hash_preimage`); `Preimage::hash_with` is the
/// method form used internally.
pub fn hash_preimage(preimage: &Preimage, algorithm: HashAlgorithm) -> PaymentHash {
    preimage.hash_with(algorithm)
}

/// Verifies `preimage` hashes to `expected` under `algorithm`. The caller
/// is responsible for supplying the same algorithm used to build the
/// contract; a mismatched algorithm silently fails verification rather
/// than erroring, matching spec §4.3's stated behavior.
pub fn verify_preimage(preimage: &Preimage, expected: &PaymentHash, algorithm: HashAlgorithm) -> bool {
    hash_preimage(preimage, algorithm) == *expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip_is_big_endian_display() {
        let h = Hash256::hash_of(b"intcoin");
        let hex = h.to_hex();
        let parsed = Hash256::from_hex(&hex).unwrap();
        assert_eq!(h, parsed);
    }

    #[test]
    fn preimage_hash_is_deterministic_per_algorithm() {
        let p = Preimage::generate();
        let h1 = p.hash_with(HashAlgorithm::Sha256);
        let h2 = p.hash_with(HashAlgorithm::Sha256);
        assert_eq!(h1, h2);

        let h3 = p.hash_with(HashAlgorithm::Sha3_256);
        assert_ne!(h1, h3);
    }

    #[test]
    fn verify_preimage_rejects_wrong_algorithm() {
        let p = Preimage::generate();
        let expected = p.hash_with(HashAlgorithm::Sha256);
        assert!(verify_preimage(&p, &expected, HashAlgorithm::Sha256));
        assert!(!verify_preimage(&p, &expected, HashAlgorithm::Ripemd160));
    }

    #[test]
    fn two_preimages_never_collide_in_practice() {
        let a = Preimage::generate();
        let b = Preimage::generate();
        assert_ne!(a.0, b.0);
    }
}
