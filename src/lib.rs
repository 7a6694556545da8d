//! `padhub` turns periodic raw snapshots of up to four XInput-style gamepad
//! slots into a stream of edge-triggered events: connect/disconnect,
//! button down/up, packet-level state changes, plus timed force-feedback
//! scheduling and deadzone-corrected analog accessors.
//!
//! One background task polls the configured slots at a fixed tick rate and
//! diffs each raw snapshot against the previous one; detected transitions
//! are routed through a single event task to broadcast subscribers, and
//! the last snapshot of every slot is published on a watch channel for
//! concurrent reads.
//!
//! ```no_run
//! use padhub::config::HubSettings;
//! use padhub::hub::HubHandle;
//! use padhub::transport::MockTransport;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), padhub::hub::HubError> {
//! let transport = Box::new(MockTransport::new());
//! let hub = HubHandle::spawn(transport, HubSettings::default())?;
//! let mut events = hub.subscribe();
//! while let Ok(event) = events.recv().await {
//!     println!("{:?}", event);
//! }
//! hub.stop();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod hub;
pub mod pad;
pub mod transport;

pub use config::{HubSettings, PadSettings};
pub use hub::{probe, HubError, HubHandle, PadEvent, PadEventKind};
pub use pad::{Buttons, MotorChannel, PadSnapshot};
pub use transport::{MockTransport, RawState, Transport, TransportError};
