//! Per-slot device state and the differential update cycle.

use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::config::PadSettings;
use crate::hub::event::PadEventKind;
use crate::pad::axis::{StickState, TriggerState};
use crate::pad::battery::{BatteryState, Capabilities};
use crate::pad::button::{ButtonState, Buttons, Transition};
use crate::pad::rumble::RumbleState;
use crate::transport::{BatteryDevice, RawState, Transport, TransportError};

/// Highest valid slot index plus one.
pub const MAX_SLOTS: u8 = 4;

const TRACKED_BUTTONS: [Buttons; 14] = [
    Buttons::DPAD_UP,
    Buttons::DPAD_DOWN,
    Buttons::DPAD_LEFT,
    Buttons::DPAD_RIGHT,
    Buttons::START,
    Buttons::BACK,
    Buttons::LEFT_THUMB,
    Buttons::RIGHT_THUMB,
    Buttons::LEFT_BUMPER,
    Buttons::RIGHT_BUMPER,
    Buttons::A,
    Buttons::B,
    Buttons::X,
    Buttons::Y,
];

/// The last-published, concurrently readable projection of one pad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PadSnapshot {
    pub slot: u8,
    pub connected: bool,
    pub packet_number: u32,
    pub buttons: Buttons,
    pub left_stick: (f32, f32),
    pub right_stick: (f32, f32),
    pub left_stick_raw: (i16, i16),
    pub right_stick_raw: (i16, i16),
    pub left_trigger: f32,
    pub right_trigger: f32,
    pub left_trigger_raw: u8,
    pub right_trigger_raw: u8,
    pub battery: BatteryState,
}

impl PadSnapshot {
    pub fn empty(slot: u8) -> Self {
        Self {
            slot,
            connected: false,
            packet_number: 0,
            buttons: Buttons::empty(),
            left_stick: (0.0, 0.0),
            right_stick: (0.0, 0.0),
            left_stick_raw: (0, 0),
            right_stick_raw: (0, 0),
            left_trigger: 0.0,
            right_trigger: 0.0,
            left_trigger_raw: 0,
            right_trigger_raw: 0,
            battery: BatteryState::default(),
        }
    }

    pub fn is_pressed(&self, mask: Buttons) -> bool {
        self.buttons.contains(mask)
    }
}

/// One device slot: the raw snapshot double-buffer plus the derived button,
/// axis, battery and rumble state. Mutated only by the polling loop.
#[derive(Debug)]
pub struct Gamepad {
    slot: u8,
    settings: PadSettings,
    connected: bool,
    current: RawState,
    previous: RawState,
    buttons: Vec<ButtonState>,
    left_stick: StickState,
    right_stick: StickState,
    left_trigger: TriggerState,
    right_trigger: TriggerState,
    battery: BatteryState,
    rumble: RumbleState,
}

impl Gamepad {
    /// Panics when `slot` is out of range; slot indices are fixed at
    /// construction and validated before anything else runs.
    pub fn new(slot: u8, settings: PadSettings) -> Self {
        assert!(slot < MAX_SLOTS, "slot index {slot} out of range 0..{MAX_SLOTS}");

        Self {
            slot,
            settings,
            connected: false,
            current: RawState::default(),
            previous: RawState::default(),
            buttons: TRACKED_BUTTONS.iter().map(|m| ButtonState::new(*m)).collect(),
            left_stick: StickState::new(settings.left_stick_dead_zone),
            right_stick: StickState::new(settings.right_stick_dead_zone),
            left_trigger: TriggerState::new(settings.left_trigger_threshold),
            right_trigger: TriggerState::new(settings.right_trigger_threshold),
            battery: BatteryState::default(),
            rumble: RumbleState::new(),
        }
    }

    pub fn slot(&self) -> u8 {
        self.slot
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn packet_number(&self) -> u32 {
        self.current.packet_number
    }

    pub fn is_pressed(&self, mask: Buttons) -> bool {
        self.buttons
            .iter()
            .find(|b| b.mask == mask)
            .is_some_and(|b| b.pressed)
    }

    pub fn battery(&self) -> BatteryState {
        self.battery
    }

    pub fn rumble(&self) -> &RumbleState {
        &self.rumble
    }

    pub fn rumble_mut(&mut self) -> &mut RumbleState {
        &mut self.rumble
    }

    pub fn set_key_down_every_tick(&mut self, enabled: bool) {
        self.settings.key_down_every_tick = enabled;
    }

    /// One differential update pass. Returns whether anything observable
    /// changed and the events to publish for this tick.
    pub fn update(
        &mut self,
        transport: &mut dyn Transport,
        now: Instant,
    ) -> (bool, Vec<PadEventKind>) {
        let mut changed = false;
        let mut events = Vec::new();

        // 1. Rotate the double-buffer, then read fresh raw state. A failed
        //    read leaves `current` untouched so the packet diff below stays
        //    quiet for an empty slot.
        self.previous = self.current;
        let connected = match transport.get_state(self.slot) {
            Ok(raw) => {
                self.current = raw;
                true
            }
            Err(TransportError::NotConnected) => false,
            Err(err) => {
                warn!(slot = self.slot, %err, "transport fault treated as disconnect");
                false
            }
        };

        // 2. Connectivity edge.
        if connected != self.connected {
            self.connected = connected;
            changed = true;
            events.push(PadEventKind::ConnectionChanged { connected });
            debug!(slot = self.slot, connected, "connection changed");
        }

        // 3. Battery refresh on every connected tick. Redundant for wired
        //    pads, kept for parity with the original wrapper.
        if self.connected {
            if let Ok(raw) = transport.get_battery(self.slot, BatteryDevice::Gamepad) {
                self.battery = raw.into();
            }
        }

        // 4. Coarse diff via the vendor packet number.
        if self.current.packet_number != self.previous.packet_number {
            changed = true;
            events.push(PadEventKind::StateChanged {
                packet_number: self.current.packet_number,
            });
            trace!(
                slot = self.slot,
                packet = self.current.packet_number,
                "packet number advanced"
            );
        }

        // 5. Per-button edge scan, aggregated into at most one KeyDown and
        //    one KeyUp mask per tick.
        if self.connected {
            let mask = Buttons::from_bits_truncate(self.current.buttons);
            let mut down = Buttons::empty();
            let mut up = Buttons::empty();

            for button in &mut self.buttons {
                match button.update(mask) {
                    Transition::Down => {
                        down |= button.mask;
                        changed = true;
                    }
                    Transition::Up => {
                        up |= button.mask;
                        changed = true;
                    }
                    Transition::None => {
                        if self.settings.key_down_every_tick && button.pressed {
                            // Held re-report: opt-in, no effect on stored
                            // transition state or on `changed`.
                            down |= button.mask;
                        }
                    }
                }
            }

            if !down.is_empty() {
                events.push(PadEventKind::KeyDown { buttons: down });
            }
            if !up.is_empty() {
                events.push(PadEventKind::KeyUp { buttons: up });
            }

            self.left_stick.set_raw(self.current.thumb_lx, self.current.thumb_ly);
            self.right_stick.set_raw(self.current.thumb_rx, self.current.thumb_ry);
            self.left_trigger.set_raw(self.current.left_trigger);
            self.right_trigger.set_raw(self.current.right_trigger);
        }

        // 6. Lazy rumble expiry, then push any pending motor speeds to the
        //    wire. While disconnected the pending flag is left alone so an
        //    unexpired effect resumes on reconnect.
        self.rumble.tick(now);
        self.flush_rumble(transport);

        (changed, events)
    }

    /// Writes pending motor speeds while connected. Also used right after
    /// an externally issued vibration command so the effect starts without
    /// waiting a full tick.
    pub fn flush_rumble(&mut self, transport: &mut dyn Transport) {
        if !self.connected {
            return;
        }
        if self.rumble.take_pending_write() {
            let (low, high) = self.rumble.speeds();
            if let Err(err) = transport.set_vibration(self.slot, low, high) {
                warn!(slot = self.slot, %err, "vibration write failed");
            }
        }
    }

    /// Capability query, on explicit request only.
    pub fn query_capabilities(
        &self,
        transport: &mut dyn Transport,
    ) -> Result<Capabilities, TransportError> {
        transport.get_capabilities(self.slot).map(Into::into)
    }

    pub fn snapshot(&self) -> PadSnapshot {
        PadSnapshot {
            slot: self.slot,
            connected: self.connected,
            packet_number: self.current.packet_number,
            buttons: Buttons::from_bits_truncate(self.current.buttons),
            left_stick: self.left_stick.normalized(),
            right_stick: self.right_stick.normalized(),
            left_stick_raw: (self.left_stick.x, self.left_stick.y),
            right_stick_raw: (self.right_stick.x, self.right_stick.y),
            left_trigger: self.left_trigger.normalized(),
            right_trigger: self.right_trigger.normalized(),
            left_trigger_raw: self.left_trigger.value,
            right_trigger_raw: self.right_trigger.value,
            battery: self.battery,
        }
    }
}
