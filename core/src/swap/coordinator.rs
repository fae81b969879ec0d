//! C4: the atomic swap coordinator, the heart of the core (§4.4). Drives
//! a two-party cross-chain swap to Completed or a safe Refunded/Failed
//! terminal state.
//!
//! Per design note (9), the cyclic C1↔C4 reference is broken by an event
//! queue: C1 enqueues `ChainEvent`s tagged with their origin chain, and a
//! single serialized worker drains them into `handle_event`, keeping
//! per-swap_id transitions totally ordered (§5).

use super::offer::{Role, SwapInfo, SwapOffer, SwapState, INITIATOR_FUND_DEADLINE_SECONDS, SAFETY_BUFFER_SECONDS};
use crate::chain::ChainId;
use crate::db::{schema::keys, Store, StoreExt};
use crate::errors::{BridgeError, BridgeResult};
use crate::hash::{HashAlgorithm, PaymentHash, Preimage};
use crate::monitor::ChainEvent;
use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct SwapRuntime {
    offer: SwapOffer,
    state: SwapState,
    role: Role,
    participant_outpoint: Option<(crate::hash::Hash256, u32)>,
    initiator_outpoint: Option<(crate::hash::Hash256, u32)>,
    /// When the participant's HTLC funding was actually observed at
    /// sufficient depth. The initiator's fund deadline is measured from
    /// this, not from the offer's locktimes, so it can never land in the
    /// past for short-horizon offers (see `check_timeouts`).
    #[serde(default)]
    participant_funded_at: Option<u64>,
    failure_reason: Option<String>,
}

fn now_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
}

pub struct AtomicSwapCoordinator<S: Store> {
    store: Arc<S>,
    /// Serializes all mutation: §5 requires per-swap total ordering, and
    /// a single mutex over the (small, in-memory-mirrored) swap table is
    /// the simplest implementation that satisfies it without a per-swap
    /// lock table.
    swaps: Mutex<HashMap<String, SwapRuntime>>,
    by_payment_hash: Mutex<HashMap<PaymentHash, String>>,
}

impl<S: Store> AtomicSwapCoordinator<S> {
    pub fn new(store: Arc<S>) -> Self {
        AtomicSwapCoordinator {
            store,
            swaps: Mutex::new(HashMap::new()),
            by_payment_hash: Mutex::new(HashMap::new()),
        }
    }

    /// Initiator role: generates a fresh preimage, never serialized into
    /// the returned offer, and stores it locally (§4.4, §6 persisted
    /// `swaps/preimages/<id>`).
    #[allow(clippy::too_many_arguments)]
    pub async fn create_offer(
        &self,
        initiator_chain: ChainId,
        participant_chain: ChainId,
        init_amount: u64,
        part_amount: u64,
        initiator_pubkey: PublicKey,
        locktime_hours: u64,
        hash_algorithm: HashAlgorithm,
    ) -> BridgeResult<SwapOffer> {
        if init_amount == 0 || part_amount == 0 {
            return Err(BridgeError::InvalidSwapState("amounts must be nonzero".into()));
        }
        if locktime_hours * 3600 < SAFETY_BUFFER_SECONDS {
            return Err(BridgeError::InvalidSwapState(
                "locktime_hours too short to carry the 24h safety buffer".into(),
            ));
        }

        let preimage = Preimage::generate();
        let payment_hash = preimage.hash_with(hash_algorithm);
        let now = now_secs();
        let swap_id = hex::encode(crate::hash::Hash256::hash_of(&[&now.to_le_bytes()[..], &payment_hash.0[..]].concat()).as_bytes());

        let offer = SwapOffer {
            swap_id: swap_id.clone(),
            initiator_chain,
            participant_chain,
            initiator_amount: init_amount,
            participant_amount: part_amount,
            payment_hash,
            hash_algorithm,
            initiator_pubkey,
            participant_pubkey: None,
            initiator_locktime: now + locktime_hours * 3600,
            participant_locktime: now + locktime_hours * 3600 - SAFETY_BUFFER_SECONDS,
            created_at: now,
            expires_at: now + locktime_hours * 3600,
        };

        let runtime = SwapRuntime {
            offer: offer.clone(),
            state: SwapState::OfferCreated,
            role: Role::Initiator,
            participant_outpoint: None,
            initiator_outpoint: None,
            participant_funded_at: None,
            failure_reason: None,
        };

        self.persist(&runtime).await?;
        self.store.put_typed(&keys::swap_preimage(&swap_id), &preimage).await?;

        self.swaps.lock().await.insert(swap_id.clone(), runtime);
        self.by_payment_hash.lock().await.insert(payment_hash, swap_id);

        Ok(offer)
    }

    /// Participant role: validates the offer's invariants and records
    /// `participant_pubkey`.
    pub async fn accept_offer(&self, mut offer: SwapOffer, participant_pubkey: PublicKey) -> BridgeResult<SwapOffer> {
        if offer.initiator_amount == 0 || offer.participant_amount == 0 {
            return Err(BridgeError::InvalidSwapState("amounts must be nonzero".into()));
        }
        if !offer.satisfies_safety_buffer() {
            return Err(BridgeError::InvalidSwapState(
                "offer does not carry the required 24h safety buffer".into(),
            ));
        }
        let now = now_secs();
        if offer.expires_at <= now {
            return Err(BridgeError::Expired("offer already expired".into()));
        }

        offer.participant_pubkey = Some(participant_pubkey);

        let runtime = SwapRuntime {
            offer: offer.clone(),
            state: SwapState::OfferAccepted,
            role: Role::Participant,
            participant_outpoint: None,
            initiator_outpoint: None,
            participant_funded_at: None,
            failure_reason: None,
        };
        self.persist(&runtime).await?;
        self.swaps.lock().await.insert(offer.swap_id.clone(), runtime);
        self.by_payment_hash.lock().await.insert(offer.payment_hash, offer.swap_id.clone());

        Ok(offer)
    }

    pub async fn get_swap_info(&self, swap_id: &str) -> BridgeResult<SwapInfo> {
        let runtime = self.load(swap_id).await?;
        Ok(SwapInfo {
            offer: runtime.offer,
            state: runtime.state,
            role: runtime.role,
            failure_reason: runtime.failure_reason,
        })
    }

    pub async fn list_active(&self) -> BridgeResult<Vec<SwapInfo>> {
        let runtimes: Vec<SwapRuntime> = self.store.scan_prefix_typed("swaps/info/").await?;
        Ok(runtimes
            .into_iter()
            .filter(|r| !r.state.is_terminal())
            .map(|r| SwapInfo {
                offer: r.offer,
                state: r.state,
                role: r.role,
                failure_reason: r.failure_reason,
            })
            .collect())
    }

    /// Required confirmation depth before a funding event on `chain`
    /// is accepted, matching C1's reorg-scan depth for that chain.
    fn required_depth(chain: ChainId) -> u64 {
        chain.reorg_scan_depth() as u64
    }

    /// Drives the state machine on an event observed on `origin_chain`.
    /// Ignores events for unknown payment hashes (not every event on a
    /// watched chain necessarily belongs to a swap this coordinator owns).
    pub async fn handle_event(&self, origin_chain: ChainId, event: ChainEvent) -> BridgeResult<()> {
        let payment_hash = match &event {
            ChainEvent::HtlcFunded { payment_hash, .. } => *payment_hash,
            ChainEvent::HtlcSpent { payment_hash, .. } => *payment_hash,
            ChainEvent::NewBlock { .. } => return Ok(()),
        };

        let swap_id = match self.by_payment_hash.lock().await.get(&payment_hash).cloned() {
            Some(id) => id,
            None => return Ok(()),
        };

        let mut swaps = self.swaps.lock().await;
        let runtime = match swaps.get_mut(&swap_id) {
            Some(r) => r,
            None => return Ok(()),
        };

        match event {
            ChainEvent::HtlcFunded {
                tx_hash, vout, confirmations, ..
            } => {
                if origin_chain == runtime.offer.participant_chain
                    && runtime.state == SwapState::OfferAccepted
                    && runtime.participant_outpoint.is_none()
                    && confirmations >= Self::required_depth(origin_chain)
                {
                    // Double-funding guard: only the first observed
                    // funding at sufficient depth counts (§4.4).
                    runtime.participant_outpoint = Some((tx_hash, vout));
                    runtime.participant_funded_at = Some(now_secs());
                    runtime.state = SwapState::ParticipantHtlcFunded;
                } else if origin_chain == runtime.offer.initiator_chain
                    && runtime.state == SwapState::ParticipantHtlcFunded
                    && runtime.initiator_outpoint.is_none()
                {
                    runtime.initiator_outpoint = Some((tx_hash, vout));
                    runtime.state = SwapState::InitiatorHtlcFunded;
                }
            }
            ChainEvent::HtlcSpent { preimage, .. } => {
                if origin_chain == runtime.offer.initiator_chain
                    && runtime.state == SwapState::InitiatorHtlcFunded
                    && preimage.is_some()
                {
                    // Preimage extraction is authoritative at depth >= 1
                    // (§4.4): act on the first sighting, don't wait for
                    // full confirmation.
                    runtime.state = SwapState::ParticipantClaimed;
                    if let Some(p) = preimage {
                        self.store.put_typed(&keys::swap_preimage(&swap_id), &p).await?;
                    }
                } else if origin_chain == runtime.offer.participant_chain && runtime.state == SwapState::ParticipantClaimed {
                    runtime.state = SwapState::Completed;
                } else if preimage.is_none() {
                    // A spend without a revealed preimage past the
                    // relevant locktime is a refund.
                    let now = now_secs();
                    if origin_chain == runtime.offer.participant_chain
                        && now >= runtime.offer.participant_locktime
                        && !runtime.state.is_terminal()
                    {
                        runtime.state = SwapState::Refunded;
                    } else if origin_chain == runtime.offer.initiator_chain
                        && now >= runtime.offer.initiator_locktime
                        && !runtime.state.is_terminal()
                    {
                        runtime.state = SwapState::Refunded;
                    }
                }
            }
            ChainEvent::NewBlock { .. } => {}
        }

        self.persist(runtime).await
    }

    /// Periodic tick applying timeout-driven transitions that don't
    /// depend on a specific chain event (§4.4 auto-Failed rule and the
    /// locktime-expiry refund branches).
    ///
    /// The fund deadline is measured from when the participant's HTLC
    /// was actually observed funded, not from a fixed offset off
    /// `participant_locktime`: the latter can already be in the past at
    /// offer-creation time for short-horizon offers (e.g. a 48h offer
    /// with `participant_locktime = created_at + 24h` computing a
    /// deadline of `created_at - 24h`), which would auto-fail swaps
    /// before the initiator has any real chance to fund. The deadline is
    /// additionally capped at `participant_locktime`, since once that
    /// locktime passes the participant's own refund path governs instead.
    pub async fn check_timeouts(&self) -> BridgeResult<()> {
        let now = now_secs();
        let mut swaps = self.swaps.lock().await;
        for runtime in swaps.values_mut() {
            if runtime.state.is_terminal() {
                continue;
            }
            let fund_deadline = runtime.participant_funded_at.map(|funded_at| {
                (funded_at + INITIATOR_FUND_DEADLINE_SECONDS).min(runtime.offer.participant_locktime)
            });

            if runtime.state == SwapState::ParticipantHtlcFunded && fund_deadline.is_some_and(|deadline| now > deadline) {
                runtime.state = SwapState::Failed;
                runtime.failure_reason = Some("initiator failed to fund within deadline".into());
            } else if now >= runtime.offer.participant_locktime && !matches!(runtime.state, SwapState::ParticipantClaimed | SwapState::Completed) {
                runtime.state = SwapState::Refunded;
            } else if now >= runtime.offer.expires_at && runtime.state == SwapState::OfferCreated {
                runtime.state = SwapState::Expired;
            }
            self.persist(runtime).await?;
        }
        Ok(())
    }

    async fn persist(&self, runtime: &SwapRuntime) -> BridgeResult<()> {
        self.store.put_typed(&keys::swap(&runtime.offer.swap_id), runtime).await
    }

    async fn load(&self, swap_id: &str) -> BridgeResult<SwapRuntime> {
        if let Some(runtime) = self.swaps.lock().await.get(swap_id) {
            return Ok(runtime.clone());
        }
        self.store
            .get_typed(&keys::swap(swap_id))
            .await?
            .ok_or(BridgeError::SwapNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use secp256k1::{Secp256k1, SecretKey};

    fn pubkey(byte: u8) -> PublicKey {
        let secp = Secp256k1::new();
        let sk = SecretKey::from_slice(&[byte; 32]).unwrap();
        PublicKey::from_secret_key(&secp, &sk)
    }

    async fn new_coordinator() -> AtomicSwapCoordinator<MemoryStore> {
        AtomicSwapCoordinator::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn create_offer_carries_the_safety_buffer() {
        let coordinator = new_coordinator().await;
        let offer = coordinator
            .create_offer(
                ChainId::Intcoin { testnet: true },
                ChainId::Bitcoin { testnet: true },
                100_000_000,
                50_000_000,
                pubkey(1),
                48,
                HashAlgorithm::Sha256,
            )
            .await
            .unwrap();
        assert!(offer.satisfies_safety_buffer());
        assert!(offer.participant_pubkey.is_none());
    }

    #[tokio::test]
    async fn rejects_offer_with_zero_amount() {
        let coordinator = new_coordinator().await;
        let result = coordinator
            .create_offer(
                ChainId::Intcoin { testnet: true },
                ChainId::Bitcoin { testnet: true },
                0,
                50_000_000,
                pubkey(1),
                48,
                HashAlgorithm::Sha256,
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn full_happy_path_reaches_completed() {
        let coordinator = new_coordinator().await;
        let initiator_chain = ChainId::Intcoin { testnet: true };
        let participant_chain = ChainId::Bitcoin { testnet: true };

        let offer = coordinator
            .create_offer(initiator_chain, participant_chain, 100_000_000, 50_000_000, pubkey(1), 48, HashAlgorithm::Sha256)
            .await
            .unwrap();
        let offer = coordinator.accept_offer(offer, pubkey(2)).await.unwrap();
        let payment_hash = offer.payment_hash;

        let tx = crate::hash::Hash256::hash_of(b"participant-funding");
        coordinator
            .handle_event(
                participant_chain,
                ChainEvent::HtlcFunded {
                    payment_hash,
                    tx_hash: tx,
                    vout: 0,
                    amount: 50_000_000,
                    script: vec![],
                    confirmations: 6,
                },
            )
            .await
            .unwrap();
        assert_eq!(
            coordinator.get_swap_info(&offer.swap_id).await.unwrap().state,
            SwapState::ParticipantHtlcFunded
        );

        let init_tx = crate::hash::Hash256::hash_of(b"initiator-funding");
        coordinator
            .handle_event(
                initiator_chain,
                ChainEvent::HtlcFunded {
                    payment_hash,
                    tx_hash: init_tx,
                    vout: 0,
                    amount: 100_000_000,
                    script: vec![],
                    confirmations: 1,
                },
            )
            .await
            .unwrap();
        assert_eq!(
            coordinator.get_swap_info(&offer.swap_id).await.unwrap().state,
            SwapState::InitiatorHtlcFunded
        );

        let preimage = Preimage::generate();
        coordinator
            .handle_event(
                initiator_chain,
                ChainEvent::HtlcSpent {
                    payment_hash,
                    tx_hash: init_tx,
                    vout: 0,
                    preimage: Some(preimage),
                },
            )
            .await
            .unwrap();
        assert_eq!(
            coordinator.get_swap_info(&offer.swap_id).await.unwrap().state,
            SwapState::ParticipantClaimed
        );

        coordinator
            .handle_event(
                participant_chain,
                ChainEvent::HtlcSpent {
                    payment_hash,
                    tx_hash: tx,
                    vout: 0,
                    preimage: Some(preimage),
                },
            )
            .await
            .unwrap();
        assert_eq!(coordinator.get_swap_info(&offer.swap_id).await.unwrap().state, SwapState::Completed);
    }

    #[tokio::test]
    async fn double_funding_only_first_counts() {
        let coordinator = new_coordinator().await;
        let initiator_chain = ChainId::Intcoin { testnet: true };
        let participant_chain = ChainId::Bitcoin { testnet: true };
        let offer = coordinator
            .create_offer(initiator_chain, participant_chain, 100_000_000, 50_000_000, pubkey(1), 48, HashAlgorithm::Sha256)
            .await
            .unwrap();
        let offer = coordinator.accept_offer(offer, pubkey(2)).await.unwrap();
        let payment_hash = offer.payment_hash;

        let first = crate::hash::Hash256::hash_of(b"first");
        let second = crate::hash::Hash256::hash_of(b"second");
        for tx in [first, second] {
            coordinator
                .handle_event(
                    participant_chain,
                    ChainEvent::HtlcFunded {
                        payment_hash,
                        tx_hash: tx,
                        vout: 0,
                        amount: 50_000_000,
                        script: vec![],
                        confirmations: 6,
                    },
                )
                .await
                .unwrap();
        }

        let info = coordinator.get_swap_info(&offer.swap_id).await.unwrap();
        assert_eq!(info.state, SwapState::ParticipantHtlcFunded);
    }

    #[tokio::test]
    async fn check_timeouts_does_not_fail_a_freshly_funded_swap() {
        let coordinator = new_coordinator().await;
        let initiator_chain = ChainId::Intcoin { testnet: true };
        let participant_chain = ChainId::Bitcoin { testnet: true };
        let offer = coordinator
            .create_offer(initiator_chain, participant_chain, 100_000_000, 50_000_000, pubkey(1), 48, HashAlgorithm::Sha256)
            .await
            .unwrap();
        let offer = coordinator.accept_offer(offer, pubkey(2)).await.unwrap();
        let payment_hash = offer.payment_hash;

        let tx = crate::hash::Hash256::hash_of(b"participant-funding");
        coordinator
            .handle_event(
                participant_chain,
                ChainEvent::HtlcFunded {
                    payment_hash,
                    tx_hash: tx,
                    vout: 0,
                    amount: 50_000_000,
                    script: vec![],
                    confirmations: 6,
                },
            )
            .await
            .unwrap();
        assert_eq!(
            coordinator.get_swap_info(&offer.swap_id).await.unwrap().state,
            SwapState::ParticipantHtlcFunded
        );

        // Participant just funded; a 48h offer means participant_locktime
        // is only 24h away, which would previously compute a fund
        // deadline of `participant_locktime - 48h` already in the past.
        coordinator.check_timeouts().await.unwrap();

        assert_eq!(
            coordinator.get_swap_info(&offer.swap_id).await.unwrap().state,
            SwapState::ParticipantHtlcFunded
        );
    }
}
