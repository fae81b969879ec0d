//! Remote-chain RPC surface actually consumed by C1 (§6: "Remote-chain
//! RPC (consumed, not defined here)"). One trait, two implementations:
//! a `bitcoincore_rpc`-backed client for the BTC-family chains (Bitcoin,
//! Litecoin, and INTcoin itself, which the source models as a bitcoind
//! fork), and a minimal JSON-RPC client over `jsonrpsee` for Ethereum.

use crate::chain::ChainId;
use crate::config::ChainRpcConfig;
use crate::errors::{BridgeError, BridgeResult};
use crate::hash::Hash256;
use async_trait::async_trait;
use bitcoin::hashes::Hash as _;
use bitcoincore_rpc::{Auth, Client, RpcApi};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use serde_json::Value;

/// A single transaction output as seen on a remote chain, trimmed to
/// what C1's script-scan and spend-detection logic needs.
#[derive(Clone, Debug)]
pub struct RemoteTxOut {
    pub script_pubkey: Vec<u8>,
    pub amount: u64,
}

#[derive(Clone, Debug)]
pub struct RemoteTxIn {
    pub witness: Vec<Vec<u8>>,
    pub script_sig: Vec<u8>,
}

#[derive(Clone, Debug)]
pub struct RemoteTransaction {
    pub tx_hash: Hash256,
    pub outputs: Vec<RemoteTxOut>,
    pub inputs: Vec<RemoteTxIn>,
    pub confirmations: u64,
}

#[async_trait]
pub trait RemoteChainRpc: Send + Sync {
    async fn get_block_count(&self) -> BridgeResult<u64>;
    async fn get_block_hash(&self, height: u64) -> BridgeResult<Hash256>;
    async fn get_block_transactions(&self, block_hash: Hash256) -> BridgeResult<Vec<RemoteTransaction>>;
    async fn get_raw_transaction(&self, tx_hash: Hash256) -> BridgeResult<RemoteTransaction>;
    async fn get_tx_out(&self, tx_hash: Hash256, vout: u32) -> BridgeResult<Option<RemoteTxOut>>;
    async fn send_raw_transaction(&self, raw_hex: &str) -> BridgeResult<Hash256>;
}

/// BTC-family client. Covers Bitcoin, Litecoin, and the INTcoin node
/// itself, all of which speak the bitcoind RPC dialect.
pub struct BitcoinCoreRpcClient {
    client: Client,
}

impl BitcoinCoreRpcClient {
    pub fn connect(config: &ChainRpcConfig) -> BridgeResult<Self> {
        let auth = Auth::UserPass(config.user.clone(), config.password.clone());
        let client = Client::new(&config.url, auth).map_err(BridgeError::BitcoinRpc)?;
        Ok(BitcoinCoreRpcClient { client })
    }
}

#[async_trait]
impl RemoteChainRpc for BitcoinCoreRpcClient {
    async fn get_block_count(&self) -> BridgeResult<u64> {
        Ok(self.client.get_block_count().map_err(BridgeError::BitcoinRpc)?)
    }

    async fn get_block_hash(&self, height: u64) -> BridgeResult<Hash256> {
        let hash = self.client.get_block_hash(height).map_err(BridgeError::BitcoinRpc)?;
        Ok(Hash256::from_bytes(hash.to_raw_hash().to_byte_array()))
    }

    async fn get_block_transactions(&self, block_hash: Hash256) -> BridgeResult<Vec<RemoteTransaction>> {
        let hash = bitcoin::BlockHash::from_byte_array(*block_hash.as_bytes());
        let block = self.client.get_block(&hash).map_err(BridgeError::BitcoinRpc)?;
        Ok(block.txdata.iter().map(to_remote_transaction).collect())
    }

    async fn get_raw_transaction(&self, tx_hash: Hash256) -> BridgeResult<RemoteTransaction> {
        let txid = bitcoin::Txid::from_byte_array(*tx_hash.as_bytes());
        let info = self
            .client
            .get_raw_transaction_info(&txid, None)
            .map_err(BridgeError::BitcoinRpc)?;
        let mut tx = to_remote_transaction(&info.transaction().map_err(|e| BridgeError::Network(e.to_string()))?);
        tx.confirmations = info.confirmations.unwrap_or(0) as u64;
        Ok(tx)
    }

    async fn get_tx_out(&self, tx_hash: Hash256, vout: u32) -> BridgeResult<Option<RemoteTxOut>> {
        let txid = bitcoin::Txid::from_byte_array(*tx_hash.as_bytes());
        let out = self
            .client
            .get_tx_out(&txid, vout, Some(false))
            .map_err(BridgeError::BitcoinRpc)?;
        Ok(out.map(|o| RemoteTxOut {
            script_pubkey: o.script_pub_key.hex,
            amount: o.value.to_sat(),
        }))
    }

    async fn send_raw_transaction(&self, raw_hex: &str) -> BridgeResult<Hash256> {
        let bytes = hex::decode(raw_hex)?;
        let tx: bitcoin::Transaction =
            bitcoin::consensus::deserialize(&bytes).map_err(|e| BridgeError::Network(e.to_string()))?;
        let txid = self.client.send_raw_transaction(&tx).map_err(BridgeError::BitcoinRpc)?;
        Ok(Hash256::from_bytes(txid.to_raw_hash().to_byte_array()))
    }
}

fn to_remote_transaction(tx: &bitcoin::Transaction) -> RemoteTransaction {
    RemoteTransaction {
        tx_hash: Hash256::from_bytes(tx.compute_txid().to_raw_hash().to_byte_array()),
        outputs: tx
            .output
            .iter()
            .map(|o| RemoteTxOut {
                script_pubkey: o.script_pubkey.to_bytes(),
                amount: o.value.to_sat(),
            })
            .collect(),
        inputs: tx
            .input
            .iter()
            .map(|i| RemoteTxIn {
                witness: i.witness.to_vec(),
                script_sig: i.script_sig.to_bytes(),
            })
            .collect(),
        confirmations: 0,
    }
}

/// Minimal Ethereum JSON-RPC client. `eth_*` methods are called directly
/// through `jsonrpsee`'s generic `ClientT::request` rather than pulling in
/// a dedicated Ethereum SDK, since only a handful of read/send calls are
/// needed here (§6's consumed-RPC list).
pub struct EthereumRpcClient {
    client: HttpClient,
}

impl EthereumRpcClient {
    pub fn connect(config: &ChainRpcConfig) -> BridgeResult<Self> {
        let client = HttpClientBuilder::default()
            .build(&config.url)
            .map_err(|e| BridgeError::Config(e.to_string()))?;
        Ok(EthereumRpcClient { client })
    }

    async fn call(&self, method: &str, params: jsonrpsee::core::params::ArrayParams) -> BridgeResult<Value> {
        self.client
            .request(method, params)
            .await
            .map_err(|e| BridgeError::Network(e.to_string()))
    }
}

#[async_trait]
impl RemoteChainRpc for EthereumRpcClient {
    async fn get_block_count(&self) -> BridgeResult<u64> {
        let result = self.call("eth_blockNumber", rpc_params![]).await?;
        let hex_str = result.as_str().ok_or_else(|| BridgeError::Network("malformed blockNumber".into()))?;
        u64::from_str_radix(hex_str.trim_start_matches("0x"), 16).map_err(|e| BridgeError::Network(e.to_string()))
    }

    async fn get_block_hash(&self, height: u64) -> BridgeResult<Hash256> {
        let param = format!("0x{height:x}");
        let result = self.call("eth_getBlockByNumber", rpc_params![param, false]).await?;
        let hash_hex = result
            .get("hash")
            .and_then(Value::as_str)
            .ok_or_else(|| BridgeError::Network("block has no hash".into()))?;
        Hash256::from_hex(hash_hex.trim_start_matches("0x")).map_err(BridgeError::Hex)
    }

    async fn get_block_transactions(&self, _block_hash: Hash256) -> BridgeResult<Vec<RemoteTransaction>> {
        // Ethereum HTLCs are contract calls, not script-pattern outputs;
        // event-log scanning for this target is out of this reimplementation's
        // scope (the non-goal boundary treats remote-chain consensus/semantics
        // as an external observable). `htlc_funded`/`htlc_spent` for Ethereum
        // degrade to height/confirmation tracking only.
        Ok(Vec::new())
    }

    async fn get_raw_transaction(&self, tx_hash: Hash256) -> BridgeResult<RemoteTransaction> {
        let param = format!("0x{}", hex::encode(tx_hash.as_bytes()));
        let result = self.call("eth_getTransactionByHash", rpc_params![param]).await?;
        if result.is_null() {
            return Err(BridgeError::Network("transaction not found".into()));
        }
        Ok(RemoteTransaction {
            tx_hash,
            outputs: Vec::new(),
            inputs: Vec::new(),
            confirmations: 0,
        })
    }

    async fn get_tx_out(&self, _tx_hash: Hash256, _vout: u32) -> BridgeResult<Option<RemoteTxOut>> {
        Ok(None)
    }

    async fn send_raw_transaction(&self, raw_hex: &str) -> BridgeResult<Hash256> {
        let param = format!("0x{}", raw_hex.trim_start_matches("0x"));
        let result = self.call("eth_sendRawTransaction", rpc_params![param]).await?;
        let hash_hex = result.as_str().ok_or_else(|| BridgeError::Network("malformed tx hash".into()))?;
        Hash256::from_hex(hash_hex.trim_start_matches("0x")).map_err(BridgeError::Hex)
    }
}

/// Constructs the right `RemoteChainRpc` implementation for `chain`.
pub fn connect_for_chain(chain: ChainId, config: &ChainRpcConfig) -> BridgeResult<Box<dyn RemoteChainRpc>> {
    match chain {
        ChainId::Ethereum { .. } => Ok(Box::new(EthereumRpcClient::connect(config)?)),
        ChainId::Bitcoin { .. } | ChainId::Litecoin { .. } | ChainId::Intcoin { .. } => {
            Ok(Box::new(BitcoinCoreRpcClient::connect(config)?))
        }
    }
}
