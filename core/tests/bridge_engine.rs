//! End-to-end bridge scenarios spanning the engine and its independent
//! monitor together (§4.5, §4.6, §8): a deposit-to-withdrawal round trip
//! that both components agree is consistent, and an expiry that proves
//! the supply invariant survives a credited-back withdrawal.

use intcoin_bridge_core::bridge::{BridgeEngine, DepositProof, Validator, ValidatorSignature, WithdrawalStatus, WrappedToken};
use intcoin_bridge_core::bridge_monitor::BridgeMonitor;
use intcoin_bridge_core::chain::ChainId;
use intcoin_bridge_core::config::{test_config, MonitorConfig};
use intcoin_bridge_core::db::memory::MemoryStore;
use intcoin_bridge_core::hash::Hash256;
use secp256k1::{schnorr::Signature, Keypair, Secp256k1, SecretKey, XOnlyPublicKey};
use std::sync::Arc;

fn xonly(byte: u8) -> XOnlyPublicKey {
    let secp = Secp256k1::new();
    let sk = SecretKey::from_slice(&[byte; 32]).unwrap();
    let keypair = Keypair::from_secret_key(&secp, &sk);
    XOnlyPublicKey::from_keypair(&keypair).0
}

fn sig_from(signer: XOnlyPublicKey) -> ValidatorSignature {
    ValidatorSignature {
        signer,
        signature: Signature::from_slice(&[0u8; 64]).unwrap(),
    }
}

async fn wired_bridge_with_config(config: intcoin_bridge_core::config::BridgeConfig) -> (Arc<BridgeEngine<MemoryStore>>, Arc<BridgeMonitor<MemoryStore>>, XOnlyPublicKey, XOnlyPublicKey) {
    let engine = Arc::new(BridgeEngine::new(Arc::new(MemoryStore::new()), config).unwrap());
    engine
        .register_wrapped_token(WrappedToken::new("wBTC", ChainId::Bitcoin { testnet: true }, 8))
        .await
        .unwrap();
    let (a, b) = (xonly(10), xonly(20));
    for v in [a, b] {
        engine.add_validator(Validator::new(v, vec![], 5_000_000, 0)).await.unwrap();
    }
    let monitor = Arc::new(BridgeMonitor::new(Arc::clone(&engine), MonitorConfig::default()));
    (engine, monitor, a, b)
}

async fn wired_bridge() -> (Arc<BridgeEngine<MemoryStore>>, Arc<BridgeMonitor<MemoryStore>>, XOnlyPublicKey, XOnlyPublicKey) {
    wired_bridge_with_config(test_config()).await
}

#[tokio::test]
async fn deposit_then_withdrawal_round_trip_stays_supply_consistent() {
    let (engine, monitor, a, b) = wired_bridge().await;

    let proof = DepositProof {
        source_tx_hash: Hash256::hash_of(b"e2e-deposit"),
        block_number: 42,
        depositor_address: vec![1],
        recipient_address: vec![7, 7],
        amount: 2_000_000,
        token: "wBTC".into(),
        validator_signatures: vec![sig_from(a), sig_from(b)],
        timestamp: 0,
    };
    engine.submit_deposit_proof(proof).await.unwrap();
    assert!(monitor.check_supply_consistency("wBTC").await.unwrap());

    let withdrawal_id = engine
        .request_withdrawal(vec![7, 7], vec![9, 9], 500_000, "wBTC")
        .await
        .unwrap();
    assert!(monitor.check_supply_consistency("wBTC").await.unwrap());

    for v in [a, b] {
        engine.sign_withdrawal(&withdrawal_id, sig_from(v)).await.unwrap();
        monitor.record_validator_activity(v).await;
    }
    let target_tx_hash = engine.execute_withdrawal(&withdrawal_id).await.unwrap();
    let withdrawal = engine.get_withdrawal(&withdrawal_id).await.unwrap();
    assert_eq!(withdrawal.status, WithdrawalStatus::Executed);
    assert_eq!(withdrawal.target_tx_hash, Some(target_tx_hash));

    assert!(monitor.check_supply_consistency("wBTC").await.unwrap());
    assert!(monitor.recent_alerts(10, None).await.is_empty());
}

#[tokio::test]
async fn an_expired_withdrawal_credits_the_burn_back_and_supply_stays_consistent() {
    // A zero-second timeout means `expires_at` is already in the past
    // the instant the request is created, so `check_expirations` can be
    // exercised without waiting on a real clock.
    let mut config = test_config();
    config.withdrawal_timeout_seconds = 0;
    let (engine, monitor, a, b) = wired_bridge_with_config(config).await;

    let proof = DepositProof {
        source_tx_hash: Hash256::hash_of(b"e2e-deposit-expiry"),
        block_number: 1,
        depositor_address: vec![],
        recipient_address: vec![3],
        amount: 1_000_000,
        token: "wBTC".into(),
        validator_signatures: vec![sig_from(a), sig_from(b)],
        timestamp: 0,
    };
    engine.submit_deposit_proof(proof).await.unwrap();

    let withdrawal_id = engine.request_withdrawal(vec![3], vec![4], 300_000, "wBTC").await.unwrap();
    assert_eq!(engine.get_balance(&[3], "wBTC").await.unwrap(), 700_000);

    engine.check_expirations().await.unwrap();
    let request = engine.get_withdrawal(&withdrawal_id).await.unwrap();
    assert_eq!(request.status, WithdrawalStatus::Expired);
    assert_eq!(engine.get_balance(&[3], "wBTC").await.unwrap(), 1_000_000);
    assert_eq!(engine.get_supply("wBTC").await.unwrap(), 1_000_000);

    assert!(monitor.check_supply_consistency("wBTC").await.unwrap());
}
