//! C4: atomic swap coordinator.

pub mod coordinator;
pub mod events;
pub mod offer;

pub use coordinator::AtomicSwapCoordinator;
pub use events::{spawn_event_forwarding, spawn_timeout_ticker};
pub use offer::{Role, SwapInfo, SwapOffer, SwapState};
