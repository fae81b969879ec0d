//! `bridge.*` JSON-RPC surface (§6). One `jsonrpsee` `#[rpc]` trait per
//! the teacher's pattern of declaring a `*RpcServer` trait and
//! implementing it directly on the component that owns the state
//! (`verifier.rs`'s `impl<R> VerifierRpcServer for Verifier<R>`), here
//! `BridgeEngine` plus the monitor it reports validator activity to.

use crate::bridge::deposit::DepositProof;
use crate::bridge::validator::{Validator, ValidatorSignature};
use crate::bridge::withdrawal::WithdrawalRequest;
use crate::bridge::{BridgeEngine, WrappedToken};
use crate::bridge_monitor::{Alert, BridgeMonitor};
use crate::config::BridgeConfig;
use crate::db::Store;
use jsonrpsee::core::{async_trait, RpcResult};
use jsonrpsee::proc_macros::rpc;
use secp256k1::XOnlyPublicKey;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
pub struct BridgeTransactions {
    pub deposits: Vec<DepositProof>,
    pub withdrawals: Vec<WithdrawalRequest>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BridgeInfo {
    pub paused: bool,
    pub config: BridgeConfig,
    pub tokens: Vec<WrappedToken>,
}

#[rpc(server, client, namespace = "bridge")]
pub trait BridgeRpc {
    #[method(name = "deposit")]
    async fn deposit(&self, proof: DepositProof) -> RpcResult<String>;

    #[method(name = "withdraw")]
    async fn withdraw(&self, requester: Vec<u8>, destination: Vec<u8>, amount: u64, token: String) -> RpcResult<String>;

    #[method(name = "sign_withdrawal")]
    async fn sign_withdrawal(&self, withdrawal_id: String, signature: ValidatorSignature) -> RpcResult<()>;

    #[method(name = "execute_withdrawal")]
    async fn execute_withdrawal(&self, withdrawal_id: String) -> RpcResult<String>;

    #[method(name = "get_withdrawal")]
    async fn get_withdrawal(&self, withdrawal_id: String) -> RpcResult<WithdrawalRequest>;

    #[method(name = "get_balance")]
    async fn get_balance(&self, address: Vec<u8>, token: String) -> RpcResult<u64>;

    #[method(name = "get_supply")]
    async fn get_supply(&self, token: String) -> RpcResult<u64>;

    #[method(name = "list_transactions")]
    async fn list_transactions(&self) -> RpcResult<BridgeTransactions>;

    #[method(name = "get_wrapped_tokens")]
    async fn get_wrapped_tokens(&self) -> RpcResult<Vec<WrappedToken>>;

    #[method(name = "get_validators")]
    async fn get_validators(&self) -> RpcResult<Vec<Validator>>;

    #[method(name = "is_validator")]
    async fn is_validator(&self, pubkey: XOnlyPublicKey) -> RpcResult<bool>;

    #[method(name = "get_config")]
    async fn get_config(&self) -> RpcResult<BridgeConfig>;

    #[method(name = "emergency_pause")]
    async fn emergency_pause(&self) -> RpcResult<()>;

    #[method(name = "emergency_resume")]
    async fn emergency_resume(&self) -> RpcResult<()>;

    #[method(name = "info")]
    async fn info(&self) -> RpcResult<BridgeInfo>;

    #[method(name = "recent_alerts")]
    async fn recent_alerts(&self, count: u32) -> RpcResult<Vec<String>>;
}

pub struct BridgeRpcImpl<S: Store> {
    pub engine: Arc<BridgeEngine<S>>,
    pub monitor: Arc<BridgeMonitor<S>>,
}

fn alert_to_line(alert: &Alert) -> String {
    format!("[{}] {}: {}", alert.severity, alert.alert_type, alert.message)
}

#[async_trait]
impl<S: Store + 'static> BridgeRpcServer for BridgeRpcImpl<S> {
    async fn deposit(&self, proof: DepositProof) -> RpcResult<String> {
        Ok(self.engine.submit_deposit_proof(proof).await?)
    }

    async fn withdraw(&self, requester: Vec<u8>, destination: Vec<u8>, amount: u64, token: String) -> RpcResult<String> {
        Ok(self.engine.request_withdrawal(requester, destination, amount, &token).await?)
    }

    async fn sign_withdrawal(&self, withdrawal_id: String, signature: ValidatorSignature) -> RpcResult<()> {
        self.monitor.record_validator_activity(signature.signer).await;
        Ok(self.engine.sign_withdrawal(&withdrawal_id, signature).await?)
    }

    async fn execute_withdrawal(&self, withdrawal_id: String) -> RpcResult<String> {
        Ok(self.engine.execute_withdrawal(&withdrawal_id).await?.to_hex())
    }

    async fn get_withdrawal(&self, withdrawal_id: String) -> RpcResult<WithdrawalRequest> {
        Ok(self.engine.get_withdrawal(&withdrawal_id).await?)
    }

    async fn get_balance(&self, address: Vec<u8>, token: String) -> RpcResult<u64> {
        Ok(self.engine.get_balance(&address, &token).await?)
    }

    async fn get_supply(&self, token: String) -> RpcResult<u64> {
        Ok(self.engine.get_supply(&token).await?)
    }

    async fn list_transactions(&self) -> RpcResult<BridgeTransactions> {
        Ok(BridgeTransactions {
            deposits: self.engine.list_deposit_proofs().await?,
            withdrawals: self.engine.list_withdrawals().await?,
        })
    }

    async fn get_wrapped_tokens(&self) -> RpcResult<Vec<WrappedToken>> {
        Ok(self.engine.get_wrapped_tokens().await)
    }

    async fn get_validators(&self) -> RpcResult<Vec<Validator>> {
        Ok(self.engine.get_validators().await)
    }

    async fn is_validator(&self, pubkey: XOnlyPublicKey) -> RpcResult<bool> {
        Ok(self.engine.is_validator(&pubkey).await)
    }

    async fn get_config(&self) -> RpcResult<BridgeConfig> {
        Ok(self.engine.get_config().await)
    }

    async fn emergency_pause(&self) -> RpcResult<()> {
        self.engine.emergency_pause().await;
        Ok(())
    }

    async fn emergency_resume(&self) -> RpcResult<()> {
        self.engine.emergency_resume().await;
        Ok(())
    }

    async fn info(&self) -> RpcResult<BridgeInfo> {
        Ok(BridgeInfo {
            paused: self.engine.is_paused().await,
            config: self.engine.get_config().await,
            tokens: self.engine.get_wrapped_tokens().await,
        })
    }

    async fn recent_alerts(&self, count: u32) -> RpcResult<Vec<String>> {
        Ok(self.monitor.recent_alerts(count as usize, None).await.iter().map(alert_to_line).collect())
    }
}
