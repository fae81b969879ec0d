//! Merkle inclusion proofs (§3 `MerkleProof`, §4.2 `verify_merkle_inclusion`).
//!
//! Bit order is pinned by spec §4.2 and SPEC_FULL.md §6 open question (1):
//! at level `i`, bit `i` of the leaf index selects which side the sibling
//! sits on — `0` means the sibling is the right-hand node, `1` means it is
//! the left-hand node.

use crate::hash::Hash256;
use serde::{Deserialize, Serialize};

/// Ordered sibling hashes plus the leaf's 0-based index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    pub siblings: Vec<Hash256>,
    pub index: u32,
}

impl MerkleProof {
    /// Recomputes the root from `leaf` through each level of `siblings`
    /// and compares it to `expected_root`.
    pub fn verify(&self, leaf: Hash256, expected_root: Hash256) -> bool {
        self.compute_root(leaf) == expected_root
    }

    pub fn compute_root(&self, leaf: Hash256) -> Hash256 {
        let mut current = leaf;
        for (level, sibling) in self.siblings.iter().enumerate() {
            let sibling_on_right = (self.index >> level) & 1 == 0;
            current = if sibling_on_right {
                combine(&current, sibling)
            } else {
                combine(sibling, &current)
            };
        }
        current
    }
}

fn combine(left: &Hash256, right: &Hash256) -> Hash256 {
    let mut buf = Vec::with_capacity(64);
    buf.extend_from_slice(left.as_bytes());
    buf.extend_from_slice(right.as_bytes());
    Hash256::hash_of(&buf)
}

/// Standalone verification entry point matching spec §4.2's
/// `verify_merkle_inclusion(tx_hash, block_hash, proof, index) -> bool`
/// signature; `block_merkle_root` stands in for a header looked up by
/// `block_hash` by the caller (`HeaderChain::verify_merkle_inclusion`).
pub fn verify_merkle_inclusion(tx_hash: Hash256, block_merkle_root: Hash256, proof: &MerkleProof) -> bool {
    proof.verify(tx_hash, block_merkle_root)
}

/// Builds a merkle tree over `leaves` and returns (root, proof-for-each-leaf).
/// Used by tests and by the bridge's own deposit-confirmation plumbing when
/// it needs to construct a reference tree rather than just verify one.
pub fn build_tree(leaves: &[Hash256]) -> (Hash256, Vec<MerkleProof>) {
    assert!(!leaves.is_empty(), "cannot build a merkle tree over zero leaves");

    // Materialize every level bottom-up; a leaf's position within level L
    // is always `original_index >> L`, since pairing never reorders
    // nodes — so a proof can be read straight off these levels afterward.
    let mut levels: Vec<Vec<Hash256>> = vec![leaves.to_vec()];
    while levels.last().unwrap().len() > 1 {
        let current = levels.last().unwrap();
        let mut next = Vec::with_capacity((current.len() + 1) / 2);
        let mut i = 0;
        while i < current.len() {
            if i + 1 < current.len() {
                next.push(combine(&current[i], &current[i + 1]));
            } else {
                // Odd leftover: duplicate, the standard Bitcoin convention.
                next.push(combine(&current[i], &current[i]));
            }
            i += 2;
        }
        levels.push(next);
    }

    let proofs = (0..leaves.len())
        .map(|leaf_index| {
            let mut siblings = Vec::new();
            let mut pos = leaf_index;
            for level in &levels[..levels.len() - 1] {
                let sibling_pos = if pos % 2 == 0 {
                    if pos + 1 < level.len() { pos + 1 } else { pos }
                } else {
                    pos - 1
                };
                siblings.push(level[sibling_pos]);
                pos /= 2;
            }
            MerkleProof {
                siblings,
                index: leaf_index as u32,
            }
        })
        .collect();

    let root = levels.last().unwrap()[0];
    (root, proofs)
}
