//! The background polling task: drives the update cycle across all
//! configured slots at a fixed tick rate until cancelled.

use std::time::Duration;

use statum::{machine, state, transition};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::HubSettings;
use crate::hub::event::PadEvent;
use crate::pad::battery::Capabilities;
use crate::pad::gamepad::{Gamepad, PadSnapshot};
use crate::pad::rumble::MotorChannel;
use crate::transport::{Transport, TransportError};

/// Commands injected from arbitrary caller contexts. They are drained and
/// applied on the polling task, which serializes them against the update
/// cycle's own expiry-driven writes.
#[derive(Debug)]
pub(crate) enum HubCommand {
    Vibrate {
        slot: u8,
        low_power: f32,
        high_power: f32,
        low_duration: Duration,
        high_duration: Duration,
    },
    VibrateChannel {
        slot: u8,
        channel: MotorChannel,
        power: f32,
        duration: Duration,
    },
    StopVibration {
        slot: u8,
    },
    SetKeyDownEveryTick {
        slot: u8,
        enabled: bool,
    },
    QueryCapabilities {
        slot: u8,
        reply: oneshot::Sender<Result<Capabilities, TransportError>>,
    },
    SetEnabled(bool),
}

#[state]
#[derive(Debug, Clone)]
pub enum PollState {
    Initializing,
    Polling,
}

#[machine]
pub struct PollWorker<PollState> {
    transport: Box<dyn Transport>,
    pads: Vec<Gamepad>,
    settings: HubSettings,
    event_tx: mpsc::Sender<PadEvent>,
    command_rx: mpsc::Receiver<HubCommand>,
    snapshot_txs: Vec<watch::Sender<PadSnapshot>>,
    cancel: CancellationToken,
}

impl PollWorker<Initializing> {
    pub(crate) fn create(
        transport: Box<dyn Transport>,
        pads: Vec<Gamepad>,
        settings: HubSettings,
        event_tx: mpsc::Sender<PadEvent>,
        command_rx: mpsc::Receiver<HubCommand>,
        snapshot_txs: Vec<watch::Sender<PadSnapshot>>,
        cancel: CancellationToken,
    ) -> Self {
        Self::builder()
            .transport(transport)
            .pads(pads)
            .settings(settings)
            .event_tx(event_tx)
            .command_rx(command_rx)
            .snapshot_txs(snapshot_txs)
            .cancel(cancel)
            .build()
    }
}

#[transition]
impl PollWorker<Initializing> {
    /// Enables device reporting and transitions into the polling state.
    pub(crate) fn initialize(mut self) -> PollWorker<Polling> {
        info!(
            slots = ?self.pads.iter().map(Gamepad::slot).collect::<Vec<_>>(),
            updates_per_second = self.settings.updates_per_second,
            "poll worker initialized"
        );
        self.transport.set_enabled(true);
        self.transition()
    }
}

impl PollWorker<Polling> {
    /// The polling loop. The cancellation token is checked before every
    /// slot update so stop latency is bounded by one slot's update cost.
    /// The inter-pass delay is measured from the end of one full pass, not
    /// against a fixed-rate clock; drift under load is accepted.
    pub(crate) async fn run(mut self) {
        let delay =
            Duration::from_millis(1000 / u64::from(self.settings.updates_per_second.max(1)));
        info!(?delay, "poll loop running");

        'outer: loop {
            self.drain_commands();

            for index in 0..self.pads.len() {
                if self.cancel.is_cancelled() {
                    break 'outer;
                }

                let (changed, kinds) = self.pads[index].update(&mut *self.transport, Instant::now());
                if !changed && kinds.is_empty() {
                    continue;
                }

                let slot = self.pads[index].slot();
                for kind in kinds {
                    match self.event_tx.try_send(PadEvent::now(slot, kind)) {
                        Ok(()) => {}
                        Err(mpsc::error::TrySendError::Full(event)) => {
                            warn!(slot, ?event, "event queue full, dropping event");
                        }
                        Err(mpsc::error::TrySendError::Closed(_)) => {
                            debug!("event router gone, stopping poll loop");
                            break 'outer;
                        }
                    }
                }
                let _ = self.snapshot_txs[index].send(self.pads[index].snapshot());
            }

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.transport.set_enabled(false);
        info!("poll loop stopped");
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.command_rx.try_recv() {
            self.apply_command(command);
        }
    }

    fn apply_command(&mut self, command: HubCommand) {
        debug!(?command, "applying hub command");
        match command {
            HubCommand::Vibrate {
                slot,
                low_power,
                high_power,
                low_duration,
                high_duration,
            } => {
                if let Some(pad) = self.pad_mut(slot) {
                    let now = Instant::now();
                    pad.rumble_mut()
                        .set(MotorChannel::Low, low_power, low_duration, now);
                    pad.rumble_mut()
                        .set(MotorChannel::High, high_power, high_duration, now);
                }
                self.flush_rumble(slot);
            }
            HubCommand::VibrateChannel {
                slot,
                channel,
                power,
                duration,
            } => {
                if let Some(pad) = self.pad_mut(slot) {
                    pad.rumble_mut().set(channel, power, duration, Instant::now());
                }
                self.flush_rumble(slot);
            }
            HubCommand::StopVibration { slot } => {
                if let Some(pad) = self.pad_mut(slot) {
                    pad.rumble_mut().stop_all();
                }
                self.flush_rumble(slot);
            }
            HubCommand::SetKeyDownEveryTick { slot, enabled } => {
                if let Some(pad) = self.pad_mut(slot) {
                    pad.set_key_down_every_tick(enabled);
                }
            }
            HubCommand::QueryCapabilities { slot, reply } => {
                let result = match self.pads.iter().find(|p| p.slot() == slot) {
                    Some(pad) => pad.query_capabilities(&mut *self.transport),
                    None => Err(TransportError::NotConnected),
                };
                let _ = reply.send(result);
            }
            HubCommand::SetEnabled(enabled) => self.transport.set_enabled(enabled),
        }
    }

    fn pad_mut(&mut self, slot: u8) -> Option<&mut Gamepad> {
        let pad = self.pads.iter_mut().find(|p| p.slot() == slot);
        if pad.is_none() {
            warn!(slot, "command for a slot the hub does not poll");
        }
        pad
    }

    fn flush_rumble(&mut self, slot: u8) {
        if let Some(index) = self.pads.iter().position(|p| p.slot() == slot) {
            self.pads[index].flush_rumble(&mut *self.transport);
        }
    }
}
