//! Polling hub: the background loop plus the caller-facing handle.
//!
//! 1. [`poll_worker`] - Cancellable tick loop driving the update cycle
//! 2. [`event`] - Typed event payloads
//! 3. [`hub_handle`] - Spawn, subscribe, vibrate, stop
//!
//! # Architecture
//!
//! ```text
//! Transport ──► PollWorker ──► mpsc ──► EventRouter ──► broadcast ──► subscribers
//!                   │
//!                   └──► watch<PadSnapshot> per slot
//! ```
//!
//! All slot state mutation happens on the poll task; external vibration
//! commands travel through a command channel into that same task.

pub mod event;
pub mod hub_handle;
pub mod poll_worker;

pub use event::{PadEvent, PadEventKind};
pub use hub_handle::{HubError, HubHandle};

use crate::transport::{Transport, TransportError};

/// One-shot, uncached availability probe: asks the driver for slot 0 and
/// reports `false` only when the driver itself cannot be reached. An empty
/// slot still counts as available.
pub fn probe(transport: &mut dyn Transport) -> bool {
    !matches!(
        transport.get_state(0),
        Err(TransportError::Unavailable)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MockTransport, RawState};

    #[test]
    fn probe_reports_missing_driver() {
        let mut transport = MockTransport::unavailable();
        assert!(!probe(&mut transport));
    }

    #[test]
    fn probe_accepts_empty_slots() {
        let mut transport = MockTransport::new();
        assert!(probe(&mut transport));
    }

    #[test]
    fn probe_accepts_connected_device() {
        let mock = MockTransport::new();
        mock.push_state(0, RawState::default());
        let mut transport = mock.clone();
        assert!(probe(&mut transport));
    }
}
