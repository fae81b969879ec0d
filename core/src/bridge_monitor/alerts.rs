//! `Alert` (§4.6 Bridge Monitor, C6): the unit of output for every check
//! `BridgeMonitor` runs. Grounded on `bridge_monitor.cpp`'s `TriggerAlert`
//! / `BridgeAlert` and the `AlertType`/`AlertSeverity` enums from
//! `bridge_monitor.h`.

use std::collections::HashMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AlertType {
    SupplyMismatch,
    ValidatorOffline,
    ValidatorMalicious,
    UnusualVolume,
    RapidWithdrawals,
    FailedValidation,
    ThresholdViolation,
    DoubleSpendAttempt,
    InvalidMerkleProof,
    EmergencyPause,
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertType::SupplyMismatch => "Supply Mismatch",
            AlertType::ValidatorOffline => "Validator Offline",
            AlertType::ValidatorMalicious => "Validator Malicious",
            AlertType::UnusualVolume => "Unusual Volume",
            AlertType::RapidWithdrawals => "Rapid Withdrawals",
            AlertType::FailedValidation => "Failed Validation",
            AlertType::ThresholdViolation => "Threshold Violation",
            AlertType::DoubleSpendAttempt => "Double Spend Attempt",
            AlertType::InvalidMerkleProof => "Invalid Merkle Proof",
            AlertType::EmergencyPause => "Emergency Pause",
        };
        write!(f, "{s}")
    }
}

/// Ordered low-to-high so `severity >= AlertSeverity::Critical` reads the
/// same as the original's enum-comparison idiom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
    Emergency,
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertSeverity::Info => "INFO",
            AlertSeverity::Warning => "WARNING",
            AlertSeverity::Critical => "CRITICAL",
            AlertSeverity::Emergency => "EMERGENCY",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Debug)]
pub struct Alert {
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    pub timestamp: u64,
    /// Computed figures backing the alert (e.g. `volume_24h`/`threshold`),
    /// mirroring the original's `metadata["..."]` side-channel so a
    /// consumer can render numbers without re-parsing `message`.
    pub metadata: HashMap<String, String>,
}

impl Alert {
    pub fn new(alert_type: AlertType, severity: AlertSeverity, message: impl Into<String>, timestamp: u64) -> Self {
        Alert {
            alert_type,
            severity,
            message: message.into(),
            timestamp,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
