//! The bridge's own watchdog (C6, §4.6): independent supply-consistency
//! checks, validator liveness tracking, and volume-anomaly detection,
//! escalating to an automatic emergency pause. See `monitor.rs`.

pub mod alerts;
pub mod monitor;

pub use alerts::{Alert, AlertSeverity, AlertType};
pub use monitor::BridgeMonitor;
