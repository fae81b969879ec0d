//! `swap.*` JSON-RPC surface (§6): the client-facing half of the atomic
//! swap coordinator. Mirrors `bridge_rpc.rs`'s shape, one trait per
//! component.

use crate::chain::ChainId;
use crate::db::Store;
use crate::hash::HashAlgorithm;
use crate::swap::coordinator::AtomicSwapCoordinator;
use crate::swap::offer::{SwapInfo, SwapOffer};
use jsonrpsee::core::{async_trait, RpcResult};
use jsonrpsee::proc_macros::rpc;
use secp256k1::PublicKey;
use std::sync::Arc;

#[rpc(server, client, namespace = "swap")]
pub trait SwapRpc {
    #[method(name = "create_offer")]
    #[allow(clippy::too_many_arguments)]
    async fn create_offer(
        &self,
        initiator_chain: ChainId,
        participant_chain: ChainId,
        initiator_amount: u64,
        participant_amount: u64,
        initiator_pubkey: PublicKey,
        locktime_hours: u64,
        hash_algorithm: HashAlgorithm,
    ) -> RpcResult<SwapOffer>;

    #[method(name = "accept_offer")]
    async fn accept_offer(&self, offer: SwapOffer, participant_pubkey: PublicKey) -> RpcResult<SwapOffer>;

    #[method(name = "get_info")]
    async fn get_info(&self, swap_id: String) -> RpcResult<SwapInfo>;

    #[method(name = "list_active")]
    async fn list_active(&self) -> RpcResult<Vec<SwapInfo>>;
}

pub struct SwapRpcImpl<S: Store> {
    pub coordinator: Arc<AtomicSwapCoordinator<S>>,
}

#[async_trait]
impl<S: Store + 'static> SwapRpcServer for SwapRpcImpl<S> {
    async fn create_offer(
        &self,
        initiator_chain: ChainId,
        participant_chain: ChainId,
        initiator_amount: u64,
        participant_amount: u64,
        initiator_pubkey: PublicKey,
        locktime_hours: u64,
        hash_algorithm: HashAlgorithm,
    ) -> RpcResult<SwapOffer> {
        Ok(self
            .coordinator
            .create_offer(
                initiator_chain,
                participant_chain,
                initiator_amount,
                participant_amount,
                initiator_pubkey,
                locktime_hours,
                hash_algorithm,
            )
            .await?)
    }

    async fn accept_offer(&self, offer: SwapOffer, participant_pubkey: PublicKey) -> RpcResult<SwapOffer> {
        Ok(self.coordinator.accept_offer(offer, participant_pubkey).await?)
    }

    async fn get_info(&self, swap_id: String) -> RpcResult<SwapInfo> {
        Ok(self.coordinator.get_swap_info(&swap_id).await?)
    }

    async fn list_active(&self) -> RpcResult<Vec<SwapInfo>> {
        Ok(self.coordinator.list_active().await?)
    }
}
