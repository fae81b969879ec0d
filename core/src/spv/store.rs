//! SPV header chain (C2): validates and stores header-only chains, serves
//! merkle inclusion proofs, and enforces the reorg/checkpoint policy of
//! §4.2.

use super::header::{BlockHeader, Work};
use super::merkle::MerkleProof;
use crate::db::{schema::keys, Store, StoreExt};
use crate::errors::{BridgeError, BridgeResult};
use crate::hash::Hash256;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

pub const MAX_REORG_DEPTH: u64 = 100;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
struct StoredHeader {
    header: BlockHeader,
    height: u64,
    cumulative_work: Work,
}

struct Inner {
    headers: std::collections::HashMap<Hash256, StoredHeader>,
    by_height: BTreeMap<u64, Hash256>,
    tip: Option<Hash256>,
    checkpoints: BTreeMap<u64, Hash256>,
}

/// Maintains the best header chain for one remote chain (or INTcoin
/// itself). Chain acceptance is serialized behind a single `RwLock` per
/// §5 ("C2 header acceptance is serialized; no concurrent reorgs").
pub struct HeaderChain<S: Store> {
    chain_name: String,
    store: Arc<S>,
    inner: RwLock<Inner>,
}

impl<S: Store> HeaderChain<S> {
    pub fn new(chain_name: impl Into<String>, store: Arc<S>, checkpoints: BTreeMap<u64, Hash256>) -> Self {
        HeaderChain {
            chain_name: chain_name.into(),
            store,
            inner: RwLock::new(Inner {
                headers: std::collections::HashMap::new(),
                by_height: BTreeMap::new(),
                tip: None,
                checkpoints,
            }),
        }
    }

    /// Registers a checkpoint at runtime. Fails if a different checkpoint
    /// already exists at that height (§4.2).
    pub async fn add_checkpoint(&self, height: u64, hash: Hash256) -> BridgeResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner.checkpoints.get(&height) {
            if *existing != hash {
                return Err(BridgeError::Config(format!(
                    "checkpoint conflict at height {height}"
                )));
            }
            return Ok(());
        }
        inner.checkpoints.insert(height, hash);
        Ok(())
    }

    pub async fn tip(&self) -> Option<Hash256> {
        self.inner.read().await.tip
    }

    pub async fn get_header(&self, hash: Hash256) -> Option<BlockHeader> {
        self.inner.read().await.headers.get(&hash).map(|s| s.header.clone())
    }

    pub async fn get_header_at_height(&self, height: u64) -> Option<BlockHeader> {
        let inner = self.inner.read().await;
        let hash = inner.by_height.get(&height)?;
        inner.headers.get(hash).map(|s| s.header.clone())
    }

    pub async fn height_of(&self, hash: Hash256) -> Option<u64> {
        self.inner.read().await.headers.get(&hash).map(|s| s.height)
    }

    /// Appends a sequence of headers to the known chain and, if the
    /// resulting candidate chain beats the current tip on cumulative
    /// work, switches to it.
    pub async fn submit_headers(&self, headers: Vec<BlockHeader>) -> BridgeResult<Hash256> {
        if headers.is_empty() {
            return Err(BridgeError::HeaderRejected("empty header batch".into()));
        }

        let mut inner = self.inner.write().await;
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();

        // First header must connect to an already-known header (our tip,
        // or any ancestor we still hold — enabling a reorg branch).
        let first = &headers[0];
        let parent = inner
            .headers
            .get(&first.prev_hash)
            .cloned()
            .ok_or_else(|| BridgeError::HeaderRejected("first header does not connect".into()))?;

        let mut running_height = parent.height;
        let mut running_work = parent.cumulative_work;
        let mut prev_hash = first.prev_hash;
        let mut validated = Vec::with_capacity(headers.len());

        for header in &headers {
            if header.prev_hash != prev_hash {
                return Err(BridgeError::HeaderRejected("broken prev_hash linkage".into()));
            }
            if !header.meets_pow_target() {
                return Err(BridgeError::HeaderRejected(format!(
                    "header {} fails its PoW target",
                    header.hash()
                )));
            }
            if header.timestamp > now + 2 * 3600 {
                return Err(BridgeError::HeaderRejected(
                    "timestamp more than 2 hours in the future".into(),
                ));
            }

            running_height += 1;
            running_work = running_work.saturating_add(header.work());
            let hash = header.hash();

            if let Some(expected) = inner.checkpoints.get(&running_height) {
                if *expected != hash {
                    return Err(BridgeError::HeaderRejected(format!(
                        "header at height {running_height} violates checkpoint"
                    )));
                }
            }

            validated.push(StoredHeader {
                header: header.clone(),
                height: running_height,
                cumulative_work: running_work,
            });
            prev_hash = hash;
        }

        // Reject deep forks: the shared ancestor (`parent`) must be
        // within MAX_REORG_DEPTH of the current tip.
        if let Some(tip_hash) = inner.tip {
            if let Some(tip) = inner.headers.get(&tip_hash) {
                if tip.height > parent.height && tip.height - parent.height > MAX_REORG_DEPTH {
                    return Err(BridgeError::HeaderRejected(
                        "candidate fork exceeds max reorg depth".into(),
                    ));
                }
            }
        }

        let candidate_tip_work = validated.last().unwrap().cumulative_work;
        let switches = match inner.tip.and_then(|h| inner.headers.get(&h)) {
            None => true,
            Some(current_tip) => candidate_tip_work > current_tip.cumulative_work,
        };

        // Store every validated header regardless of whether it becomes
        // the new best tip — it may anchor a future winning fork.
        for stored in &validated {
            let hash = stored.header.hash();
            inner.headers.insert(hash, stored.clone());
            self.persist_header(&hash, stored).await?;
        }

        if switches {
            for stored in &validated {
                let hash = stored.header.hash();
                inner.by_height.insert(stored.height, hash);
            }
            let new_tip = validated.last().unwrap().header.hash();
            inner.tip = Some(new_tip);
            self.store
                .put(&keys::tip(&self.chain_name), new_tip.as_bytes().to_vec())
                .await?;
            tracing::info!(chain = %self.chain_name, height = running_height, %new_tip, "header chain tip advanced");
            Ok(new_tip)
        } else {
            tracing::debug!(chain = %self.chain_name, "accepted headers but did not switch tip (less work)");
            Ok(inner.tip.expect("tip must exist once any header is stored"))
        }
    }

    async fn persist_header(&self, hash: &Hash256, stored: &StoredHeader) -> BridgeResult<()> {
        self.store
            .put_typed(&keys::header(&self.chain_name, &hash.to_hex()), stored)
            .await?;
        self.store
            .put_typed(&keys::header_by_height(&self.chain_name, stored.height), &hash)
            .await
    }

    /// Seeds the chain with a trusted genesis header (height 0), bypassing
    /// the "must connect to known tip" rule since there is nothing to
    /// connect to yet.
    pub async fn seed_genesis(&self, header: BlockHeader) -> BridgeResult<()> {
        let mut inner = self.inner.write().await;
        if inner.tip.is_some() {
            return Err(BridgeError::HeaderRejected("chain already seeded".into()));
        }
        let hash = header.hash();
        let stored = StoredHeader {
            cumulative_work: header.work(),
            height: 0,
            header,
        };
        inner.headers.insert(hash, stored.clone());
        inner.by_height.insert(0, hash);
        inner.tip = Some(hash);
        drop(inner);
        self.persist_header(&hash, &stored).await?;
        self.store.put(&keys::tip(&self.chain_name), hash.as_bytes().to_vec()).await
    }

    /// Recomputes the merkle root from `proof` starting at `tx_hash` and
    /// compares it to the stored header at `block_hash`.
    pub async fn verify_merkle_inclusion(&self, tx_hash: Hash256, block_hash: Hash256, proof: &MerkleProof) -> BridgeResult<bool> {
        let header = self
            .get_header(block_hash)
            .await
            .ok_or_else(|| BridgeError::ChainConsistency("unknown block hash".into()))?;
        Ok(proof.verify(tx_hash, header.merkle_root))
    }
}
