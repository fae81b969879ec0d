//! C6: the bridge monitor. Periodically recomputes the supply invariant
//! independently of `BridgeEngine`'s own bookkeeping, tracks validator
//! liveness, and watches rolling volume for anomalies, auto-pausing the
//! bridge on an `Emergency` alert.
//!
//! Grounded on `bridge_monitor.cpp`'s `RunHealthCheck` / `DetectAnomalies`
//! / `CheckValidatorActivity` / `TriggerAlert`. Two corrections from the
//! original, recorded in `DESIGN.md`: (1) `CheckSupplyConsistency` there
//! compared minted supply against a hardcoded `locked_amount = 0` (a
//! stub); here it's computed for real from the sum of accepted deposit
//! proofs minus non-expired withdrawals, which needs no remote-chain
//! oracle. (2) the original's rapid-withdrawal check summed withdrawal
//! *amount* against a threshold named `max_withdrawals_per_hour`,
//! conflating volume and count; here a snapshot tracks withdrawal count
//! separately so the check matches what the config name says.

use super::alerts::{Alert, AlertSeverity, AlertType};
use crate::bridge::engine::BridgeEngine;
use crate::bridge::withdrawal::WithdrawalStatus;
use crate::config::MonitorConfig;
use crate::db::Store;
use crate::errors::BridgeResult;
use secp256k1::XOnlyPublicKey;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

const MAX_ALERTS: usize = 10_000;
const MAX_VOLUME_SNAPSHOTS: usize = 288; // 24h at 5-minute intervals
const VALIDATOR_INACTIVITY_SECONDS: u64 = 24 * 3600;

fn now_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
}

#[derive(Clone, Copy, Debug)]
struct VolumeSnapshot {
    deposits_amount: u64,
    withdrawals_amount: u64,
    withdrawal_count: u32,
    timestamp: u64,
}

pub struct BridgeMonitor<S: Store> {
    engine: Arc<BridgeEngine<S>>,
    config: MonitorConfig,
    alerts: Mutex<VecDeque<Alert>>,
    volume_history: Mutex<VecDeque<VolumeSnapshot>>,
    validator_last_active: Mutex<HashMap<XOnlyPublicKey, u64>>,
    last_tick_at: Mutex<u64>,
}

impl<S: Store> BridgeMonitor<S> {
    pub fn new(engine: Arc<BridgeEngine<S>>, config: MonitorConfig) -> Self {
        let now = now_secs();
        BridgeMonitor {
            engine,
            config,
            alerts: Mutex::new(VecDeque::new()),
            volume_history: Mutex::new(VecDeque::new()),
            validator_last_active: Mutex::new(HashMap::new()),
            last_tick_at: Mutex::new(now),
        }
    }

    /// Marks `pubkey` as having acted just now. Called by the RPC layer
    /// whenever a validator's signature is accepted on a deposit proof
    /// or withdrawal.
    pub async fn record_validator_activity(&self, pubkey: XOnlyPublicKey) {
        self.validator_last_active.lock().await.insert(pubkey, now_secs());
    }

    pub async fn recent_alerts(&self, count: usize, min_severity: Option<AlertSeverity>) -> Vec<Alert> {
        self.alerts
            .lock()
            .await
            .iter()
            .rev()
            .filter(|a| min_severity.map(|min| a.severity >= min).unwrap_or(true))
            .take(count)
            .cloned()
            .collect()
    }

    async fn trigger(&self, alert: Alert) {
        let severity = alert.severity;
        tracing::warn!(%severity, alert_type = %alert.alert_type, message = %alert.message, "bridge alert");

        let mut alerts = self.alerts.lock().await;
        alerts.push_back(alert);
        while alerts.len() > MAX_ALERTS {
            alerts.pop_front();
        }
        drop(alerts);

        if severity == AlertSeverity::Emergency {
            self.engine.emergency_pause().await;
            tracing::error!("bridge monitor: emergency pause triggered by alert");
        }
    }

    /// Recomputes `minted - burned` independently from `BridgeEngine`'s
    /// own running `total_supply` counter and alerts on any drift. Burned
    /// excludes `Expired` requests, whose amount was credited back.
    pub async fn check_supply_consistency(&self, symbol: &str) -> BridgeResult<bool> {
        let proofs = self.engine.list_deposit_proofs().await?;
        let withdrawals = self.engine.list_withdrawals().await?;

        let minted: u64 = proofs.iter().filter(|p| p.token == symbol).map(|p| p.amount).sum();
        let burned: u64 = withdrawals
            .iter()
            .filter(|w| w.token == symbol && w.status != WithdrawalStatus::Expired)
            .map(|w| w.amount)
            .sum();
        let expected = minted.saturating_sub(burned);
        let actual = self.engine.get_supply(symbol).await?;
        let consistent = expected == actual;

        if !consistent {
            let alert = Alert::new(
                AlertType::SupplyMismatch,
                AlertSeverity::Critical,
                format!("supply mismatch detected for {symbol}"),
                now_secs(),
            )
            .with_metadata("token", symbol)
            .with_metadata("expected", expected.to_string())
            .with_metadata("actual", actual.to_string());
            self.trigger(alert).await;
        }
        Ok(consistent)
    }

    /// Records a volume snapshot covering everything since the previous
    /// tick, then trims the ring to the last 24h (§4.6).
    async fn record_volume_snapshot(&self) -> BridgeResult<()> {
        let now = now_secs();
        let mut last_tick = self.last_tick_at.lock().await;
        let since = *last_tick;
        *last_tick = now;
        drop(last_tick);

        let proofs = self.engine.list_deposit_proofs().await?;
        let withdrawals = self.engine.list_withdrawals().await?;
        let deposits_amount: u64 = proofs.iter().filter(|p| p.timestamp >= since).map(|p| p.amount).sum();
        let recent_withdrawals: Vec<_> = withdrawals.iter().filter(|w| w.created_at >= since).collect();
        let withdrawals_amount: u64 = recent_withdrawals.iter().map(|w| w.amount).sum();
        let withdrawal_count = recent_withdrawals.len() as u32;

        let mut history = self.volume_history.lock().await;
        history.push_back(VolumeSnapshot {
            deposits_amount,
            withdrawals_amount,
            withdrawal_count,
            timestamp: now,
        });
        while history.len() > MAX_VOLUME_SNAPSHOTS {
            history.pop_front();
        }
        Ok(())
    }

    async fn detect_anomalies(&self) {
        let now = now_secs();
        let day_ago = now.saturating_sub(24 * 3600);
        let hour_ago = now.saturating_sub(3600);
        let history = self.volume_history.lock().await.clone();

        let volume_24h: u64 = history
            .iter()
            .filter(|s| s.timestamp >= day_ago)
            .map(|s| s.deposits_amount + s.withdrawals_amount)
            .sum();
        if volume_24h > self.config.max_24h_volume {
            let alert = Alert::new(AlertType::UnusualVolume, AlertSeverity::Warning, "unusually high 24h volume", now)
                .with_metadata("volume_24h", volume_24h.to_string())
                .with_metadata("threshold", self.config.max_24h_volume.to_string());
            self.trigger(alert).await;
        }

        let withdrawals_1h: u32 = history.iter().filter(|s| s.timestamp >= hour_ago).map(|s| s.withdrawal_count).sum();
        if withdrawals_1h > self.config.max_withdrawals_per_hour {
            let alert = Alert::new(AlertType::RapidWithdrawals, AlertSeverity::Critical, "rapid withdrawal activity detected", now)
                .with_metadata("withdrawals_1h", withdrawals_1h.to_string())
                .with_metadata("threshold", self.config.max_withdrawals_per_hour.to_string());
            self.trigger(alert).await;
        }
    }

    /// One full health-check pass: volume snapshot, validator liveness,
    /// anomaly detection, plus supply consistency for every registered
    /// token. Intended to be called on a fixed interval by `bin/bridge_node.rs`.
    pub async fn run_health_check(&self) -> BridgeResult<()> {
        tracing::info!("bridge monitor: running health check");
        self.record_volume_snapshot().await?;
        self.check_validator_activity_once().await;
        self.detect_anomalies().await;
        for token in self.engine.get_wrapped_tokens().await {
            self.check_supply_consistency(&token.symbol).await?;
        }
        tracing::info!("bridge monitor: health check complete");
        Ok(())
    }

    async fn check_validator_activity_once(&self) {
        let now = now_secs();
        let validators = self.engine.get_validators().await;
        for validator in validators {
            let last = {
                let map = self.validator_last_active.lock().await;
                map.get(&validator.public_key).copied().unwrap_or(validator.joined_at)
            };
            if now.saturating_sub(last) > VALIDATOR_INACTIVITY_SECONDS {
                let alert = Alert::new(
                    AlertType::ValidatorOffline,
                    AlertSeverity::Warning,
                    "validator has been inactive for over 24h",
                    now,
                )
                .with_metadata("validator", validator.public_key.to_string())
                .with_metadata("hours_inactive", (now.saturating_sub(last) / 3600).to_string());
                self.trigger(alert).await;
            }
        }
    }
}
