//! Public handle over the polling subsystem: spawns the poll worker and
//! the event router, and carries the caller-facing API.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::HubSettings;
use crate::hub::event::PadEvent;
use crate::hub::poll_worker::{HubCommand, PollWorker};
use crate::pad::battery::Capabilities;
use crate::pad::gamepad::{Gamepad, PadSnapshot, MAX_SLOTS};
use crate::pad::rumble::MotorChannel;
use crate::transport::{Transport, TransportError};

/// Hub failures.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("slot index {0} out of range 0..{MAX_SLOTS}")]
    InvalidSlot(u8),

    #[error("slot index {0} listed twice")]
    DuplicateSlot(u8),

    #[error("no slots configured")]
    NoSlots,

    #[error("hub is no longer running")]
    ChannelClosed,

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Handle to one running hub.
///
/// A handle IS the running polling loop: `spawn` constructs a fresh hub
/// each call and there is no global registry, so a re-entrant start cannot
/// happen. [`HubHandle::stop`] is idempotent.
#[derive(Debug)]
pub struct HubHandle {
    command_tx: mpsc::Sender<HubCommand>,
    event_tx: broadcast::Sender<PadEvent>,
    snapshot_rxs: Vec<(u8, watch::Receiver<PadSnapshot>)>,
    cancel: CancellationToken,
}

impl HubHandle {
    /// Validates the slot list, then spawns the poll worker and the event
    /// router as two tokio tasks.
    pub fn spawn(
        transport: Box<dyn Transport>,
        settings: HubSettings,
    ) -> Result<Self, HubError> {
        if settings.slots.is_empty() {
            return Err(HubError::NoSlots);
        }
        for (i, &slot) in settings.slots.iter().enumerate() {
            if slot >= MAX_SLOTS {
                return Err(HubError::InvalidSlot(slot));
            }
            if settings.slots[..i].contains(&slot) {
                return Err(HubError::DuplicateSlot(slot));
            }
        }

        let capacity = settings.channel_capacity.max(1);
        let (raw_event_tx, raw_event_rx) = mpsc::channel(capacity);
        let (command_tx, command_rx) = mpsc::channel(capacity);
        let (event_tx, _) = broadcast::channel(capacity);
        let cancel = CancellationToken::new();

        let pads: Vec<Gamepad> = settings
            .slots
            .iter()
            .map(|&slot| Gamepad::new(slot, settings.pad))
            .collect();

        let mut snapshot_txs = Vec::with_capacity(pads.len());
        let mut snapshot_rxs = Vec::with_capacity(pads.len());
        for pad in &pads {
            let (tx, rx) = watch::channel(PadSnapshot::empty(pad.slot()));
            snapshot_txs.push(tx);
            snapshot_rxs.push((pad.slot(), rx));
        }

        info!(slots = ?settings.slots, "spawning hub");

        let worker = PollWorker::create(
            transport,
            pads,
            settings,
            raw_event_tx,
            command_rx,
            snapshot_txs,
            cancel.clone(),
        );
        tokio::spawn(async move {
            worker.initialize().run().await;
        });

        let router_tx = event_tx.clone();
        tokio::spawn(async move {
            run_event_router(raw_event_rx, router_tx).await;
        });

        Ok(Self {
            command_tx,
            event_tx,
            snapshot_rxs,
            cancel,
        })
    }

    /// A new subscription to the typed event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<PadEvent> {
        self.event_tx.subscribe()
    }

    /// Watch channel carrying the last-published snapshot of `slot`.
    /// Safe to read from any context.
    pub fn watch_pad(&self, slot: u8) -> Result<watch::Receiver<PadSnapshot>, HubError> {
        self.snapshot_rxs
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, rx)| rx.clone())
            .ok_or(HubError::InvalidSlot(slot))
    }

    /// Arms both motors. A zero duration stops the matching channel.
    pub async fn vibrate(
        &self,
        slot: u8,
        low_power: f32,
        high_power: f32,
        low_duration: Duration,
        high_duration: Duration,
    ) -> Result<(), HubError> {
        self.send(HubCommand::Vibrate {
            slot,
            low_power,
            high_power,
            low_duration,
            high_duration,
        })
        .await
    }

    /// Arms a single motor channel, leaving the other untouched.
    pub async fn vibrate_channel(
        &self,
        slot: u8,
        channel: MotorChannel,
        power: f32,
        duration: Duration,
    ) -> Result<(), HubError> {
        self.send(HubCommand::VibrateChannel {
            slot,
            channel,
            power,
            duration,
        })
        .await
    }

    pub async fn stop_vibration(&self, slot: u8) -> Result<(), HubError> {
        self.send(HubCommand::StopVibration { slot }).await
    }

    /// Opt into re-reporting held buttons in the KeyDown mask every tick.
    pub async fn set_key_down_every_tick(&self, slot: u8, enabled: bool) -> Result<(), HubError> {
        self.send(HubCommand::SetKeyDownEveryTick { slot, enabled })
            .await
    }

    /// Global input reporting switch of the underlying driver.
    pub async fn set_enabled(&self, enabled: bool) -> Result<(), HubError> {
        self.send(HubCommand::SetEnabled(enabled)).await
    }

    /// Capability report for `slot`, fetched on request only.
    pub async fn query_capabilities(&self, slot: u8) -> Result<Capabilities, HubError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(HubCommand::QueryCapabilities {
            slot,
            reply: reply_tx,
        })
        .await?;
        let caps = reply_rx.await.map_err(|_| HubError::ChannelClosed)??;
        Ok(caps)
    }

    /// Requests cooperative shutdown of the polling task. Latency is
    /// bounded by one slot update plus one tick delay. Calling this more
    /// than once is a no-op.
    pub fn stop(&self) {
        debug!("hub stop requested");
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    async fn send(&self, command: HubCommand) -> Result<(), HubError> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| HubError::ChannelClosed)
    }
}

impl Drop for HubHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Single consumer of the poll task's event queue; the one place events
/// fan out to subscribers, so callbacks never observe concurrent dispatch.
async fn run_event_router(
    mut raw_event_rx: mpsc::Receiver<PadEvent>,
    event_tx: broadcast::Sender<PadEvent>,
) {
    while let Some(event) = raw_event_rx.recv().await {
        debug!(?event, "routing event");
        // A send error only means nobody is subscribed right now.
        let _ = event_tx.send(event);
    }
    debug!("event router drained, shutting down");
}
