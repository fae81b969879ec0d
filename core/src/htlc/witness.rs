//! Spend-time witness construction (§4.3): `build_claim_witness` and
//! `build_refund_witness` produce the data blobs consumed by the two
//! spend paths `script::build_htlc_script` encodes.

use crate::hash::Preimage;

/// Ordered witness stack elements, chain-agnostic (a BTC-family witness
/// stack, an INTcoin script-sig push sequence, or an EVM calldata tuple
/// all reduce to an ordered list of byte blobs at this layer).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Witness(pub Vec<Vec<u8>>);

/// Claim path: reveals `preimage` and proves ownership of the recipient
/// key via `signature`. Revealing the preimage here is what `ChainMonitor`
/// later extracts from the spending transaction (§4.1).
pub fn build_claim_witness(preimage: &Preimage, signature: &[u8]) -> Witness {
    Witness(vec![signature.to_vec(), preimage.0.to_vec(), vec![1]])
}

/// Refund path: only a signature is needed; the script itself enforces
/// the locktime check before the signature is verified.
pub fn build_refund_witness(signature: &[u8]) -> Witness {
    Witness(vec![signature.to_vec(), vec![]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_witness_carries_preimage_and_selector() {
        let preimage = Preimage::generate();
        let witness = build_claim_witness(&preimage, b"sig");
        assert_eq!(witness.0[1], preimage.0.to_vec());
        assert_eq!(witness.0.last().unwrap(), &vec![1]);
    }

    #[test]
    fn refund_witness_carries_empty_selector() {
        let witness = build_refund_witness(b"sig");
        assert_eq!(witness.0.last().unwrap(), &Vec::<u8>::new());
    }
}
