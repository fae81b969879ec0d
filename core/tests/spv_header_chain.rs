//! End-to-end SPV scenarios spanning reorg resolution and merkle
//! inclusion together, as the bridge engine would actually consume
//! `HeaderChain` when confirming a deposit (§4.2, §4.5).

use intcoin_bridge_core::db::memory::MemoryStore;
use intcoin_bridge_core::hash::Hash256;
use intcoin_bridge_core::spv::{BlockHeader, HeaderChain};
use std::collections::BTreeMap;
use std::sync::Arc;

const EASY_BITS: u32 = 0x207fffff;

fn header(prev: Hash256, merkle_root: Hash256, nonce: u32, timestamp: u64) -> BlockHeader {
    BlockHeader {
        version: 1,
        prev_hash: prev,
        merkle_root,
        timestamp,
        bits: EASY_BITS,
        nonce,
    }
}

async fn seeded_chain() -> HeaderChain<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let chain = HeaderChain::new("bitcoin-testnet", store, BTreeMap::new());
    chain
        .seed_genesis(header(Hash256::ZERO, Hash256::hash_of(b"genesis-txs"), 0, 1_700_000_000))
        .await
        .unwrap();
    chain
}

#[tokio::test]
async fn a_longer_fork_displaces_the_current_tip() {
    let chain = seeded_chain().await;
    let genesis = chain.tip().await.unwrap();

    let short_branch = header(genesis, Hash256::hash_of(b"short-1"), 1, 1_700_000_100);
    let short_tip = chain.submit_headers(vec![short_branch]).await.unwrap();
    assert_eq!(chain.height_of(short_tip).await, Some(1));

    // A two-header fork off genesis carries strictly more cumulative
    // work than the one-header branch above and must win.
    let fork_1 = header(genesis, Hash256::hash_of(b"fork-1"), 2, 1_700_000_150);
    let fork_1_hash = fork_1.hash();
    let fork_2 = header(fork_1_hash, Hash256::hash_of(b"fork-2"), 3, 1_700_000_200);
    let new_tip = chain.submit_headers(vec![fork_1, fork_2]).await.unwrap();

    assert_eq!(chain.tip().await, Some(new_tip));
    assert_eq!(chain.height_of(new_tip).await, Some(2));
    // The losing branch is still held, not discarded, in case it wins later.
    assert!(chain.get_header(short_tip).await.is_some());
}

#[tokio::test]
async fn merkle_inclusion_verifies_against_the_accepted_tip() {
    use intcoin_bridge_core::spv::merkle::build_tree;

    let deposit_tx = Hash256::hash_of(b"deposit-tx");
    let other_tx = Hash256::hash_of(b"unrelated-tx");
    let (root, proofs) = build_tree(&[deposit_tx, other_tx]);

    let chain = seeded_chain().await;
    let genesis = chain.tip().await.unwrap();
    let block = header(genesis, root, 1, 1_700_000_100);
    let block_hash = block.hash();
    chain.submit_headers(vec![block]).await.unwrap();

    let included = chain.verify_merkle_inclusion(deposit_tx, block_hash, &proofs[0]).await.unwrap();
    assert!(included);

    // A proof for the wrong transaction against the same block fails.
    let wrong = chain.verify_merkle_inclusion(other_tx, block_hash, &proofs[0]).await.unwrap();
    assert!(!wrong);
}

#[tokio::test]
async fn checkpoint_set_before_genesis_protects_an_early_height() {
    let store = Arc::new(MemoryStore::new());
    let genesis = header(Hash256::ZERO, Hash256::hash_of(b"genesis"), 0, 1_700_000_000);
    let legit_h1 = header(genesis.hash(), Hash256::hash_of(b"legit-1"), 1, 1_700_000_100);

    let mut checkpoints = BTreeMap::new();
    checkpoints.insert(1u64, legit_h1.hash());
    let chain = HeaderChain::new("bitcoin-testnet", store, checkpoints);
    chain.seed_genesis(genesis.clone()).await.unwrap();

    let attacker_h1 = header(genesis.hash(), Hash256::hash_of(b"attacker-1"), 99, 1_700_000_100);
    assert!(chain.submit_headers(vec![attacker_h1]).await.is_err());
    assert!(chain.submit_headers(vec![legit_h1]).await.is_ok());
}
