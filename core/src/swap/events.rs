//! Event plumbing binding C1's monitors to C4's coordinator (§9 design
//! note: "callback-based event plumbing... becomes explicit channels").
//! One task per watched chain forwards that chain's `ChainEvent`s into
//! the coordinator; a second task ticks `check_timeouts` periodically.

use super::coordinator::AtomicSwapCoordinator;
use crate::chain::ChainId;
use crate::db::Store;
use crate::monitor::ChainMonitor;
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT_TICK_INTERVAL: Duration = Duration::from_secs(60);

/// Spawns one forwarding task per `(chain, monitor)` pair, each draining
/// that monitor's event receiver into `coordinator.handle_event`. Panics
/// if a monitor's receiver was already taken elsewhere — each monitor
/// must be wired to exactly one consumer.
pub fn spawn_event_forwarding<S: Store + 'static>(
    monitors: Vec<(ChainId, Arc<dyn ChainMonitor>)>,
    coordinator: Arc<AtomicSwapCoordinator<S>>,
) -> Vec<tokio::task::JoinHandle<()>> {
    let mut handles = Vec::with_capacity(monitors.len());
    for (chain, monitor) in monitors {
        let mut receiver = monitor
            .take_event_receiver()
            .expect("chain monitor event receiver already claimed");
        let coordinator = Arc::clone(&coordinator);
        handles.push(tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                if let Err(err) = coordinator.handle_event(chain, event).await {
                    tracing::warn!(%chain, %err, "swap coordinator failed to process chain event");
                }
            }
        }));
    }
    handles
}

pub fn spawn_timeout_ticker<S: Store + 'static>(coordinator: Arc<AtomicSwapCoordinator<S>>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TIMEOUT_TICK_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(err) = coordinator.check_timeouts().await {
                tracing::warn!(%err, "swap timeout sweep failed");
            }
        }
    })
}
