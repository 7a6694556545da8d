//! The fixed vendor call surface the hub polls.
//!
//! Everything in here mirrors the XInput-shaped driver API one-to-one:
//! one state read, one vibration write, capability and battery queries and
//! a global enable switch. The hub never talks to the driver directly;
//! it goes through [`Transport`] so tests and the demo binary can substitute
//! a scripted double.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tracing::debug;

/// Raw device snapshot as returned by one state read.
///
/// `packet_number` increments exactly when some other field changed, so a
/// stable packet number is the authoritative "nothing happened" signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawState {
    pub packet_number: u32,
    pub buttons: u16,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub thumb_lx: i16,
    pub thumb_ly: i16,
    pub thumb_rx: i16,
    pub thumb_ry: i16,
}

/// Raw capability report, decoded by [`crate::pad::battery::Capabilities`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawCapabilities {
    pub device_type: u8,
    pub sub_type: u8,
    pub flags: u16,
}

/// Raw battery report: source type byte and charge level byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawBattery {
    pub battery_type: u8,
    pub charge_level: u8,
}

/// Which device on a slot a battery query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryDevice {
    Gamepad = 0x00,
    Headset = 0x01,
}

/// Transport failures.
///
/// `NotConnected` is the normal signal for an empty slot and is recovered
/// locally by the update cycle; only `Unavailable` means the driver itself
/// cannot be reached.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("no device connected on this slot")]
    NotConnected,

    #[error("input driver unavailable")]
    Unavailable,

    #[error("transport I/O error: {0}")]
    Io(String),
}

/// The driver seam. One implementor wraps the real vendor library; the
/// other is [`MockTransport`].
pub trait Transport: Send {
    fn get_state(&mut self, slot: u8) -> Result<RawState, TransportError>;

    fn set_vibration(&mut self, slot: u8, low: u16, high: u16) -> Result<(), TransportError>;

    fn get_capabilities(&mut self, slot: u8) -> Result<RawCapabilities, TransportError>;

    fn get_battery(
        &mut self,
        slot: u8,
        device: BatteryDevice,
    ) -> Result<RawBattery, TransportError>;

    /// Global input reporting switch. No result code on the wire.
    fn set_enabled(&mut self, enabled: bool);
}

#[derive(Debug, Default)]
struct MockSlot {
    script: VecDeque<Result<RawState, TransportError>>,
    // Once the script runs dry the last response repeats forever.
    last: Option<Result<RawState, TransportError>>,
    battery: RawBattery,
    capabilities: RawCapabilities,
}

#[derive(Debug, Default)]
struct MockInner {
    slots: [MockSlot; 4],
    vibration_log: Vec<(u8, u16, u16)>,
    enabled: bool,
    unavailable: bool,
}

/// Scripted transport double used by tests and the demo binary.
///
/// Each slot holds a queue of canned responses; when the queue is empty the
/// last response repeats, which models a device sitting still. All vibration
/// writes are recorded so tests can assert on what actually reached the
/// "hardware". Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockInner>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose every call reports a missing driver.
    pub fn unavailable() -> Self {
        let mock = Self::new();
        mock.inner.lock().unwrap().unavailable = true;
        mock
    }

    /// Queue one connected snapshot for `slot`.
    pub fn push_state(&self, slot: u8, state: RawState) {
        let mut inner = self.inner.lock().unwrap();
        inner.slots[slot as usize].script.push_back(Ok(state));
    }

    /// Queue a disconnected tick for `slot`.
    pub fn push_disconnected(&self, slot: u8) {
        let mut inner = self.inner.lock().unwrap();
        inner.slots[slot as usize]
            .script
            .push_back(Err(TransportError::NotConnected));
    }

    pub fn set_battery(&self, slot: u8, battery: RawBattery) {
        self.inner.lock().unwrap().slots[slot as usize].battery = battery;
    }

    pub fn set_capabilities(&self, slot: u8, caps: RawCapabilities) {
        self.inner.lock().unwrap().slots[slot as usize].capabilities = caps;
    }

    /// Every `(slot, low, high)` triple written so far, oldest first.
    pub fn vibration_log(&self) -> Vec<(u8, u16, u16)> {
        self.inner.lock().unwrap().vibration_log.clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.lock().unwrap().enabled
    }
}

impl Transport for MockTransport {
    fn get_state(&mut self, slot: u8) -> Result<RawState, TransportError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.unavailable {
            return Err(TransportError::Unavailable);
        }
        let mock_slot = &mut inner.slots[slot as usize];
        if let Some(next) = mock_slot.script.pop_front() {
            mock_slot.last = Some(next.clone());
            next
        } else {
            mock_slot
                .last
                .clone()
                .unwrap_or(Err(TransportError::NotConnected))
        }
    }

    fn set_vibration(&mut self, slot: u8, low: u16, high: u16) -> Result<(), TransportError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.unavailable {
            return Err(TransportError::Unavailable);
        }
        debug!(slot, low, high, "mock vibration write");
        inner.vibration_log.push((slot, low, high));
        Ok(())
    }

    fn get_capabilities(&mut self, slot: u8) -> Result<RawCapabilities, TransportError> {
        let inner = self.inner.lock().unwrap();
        if inner.unavailable {
            return Err(TransportError::Unavailable);
        }
        Ok(inner.slots[slot as usize].capabilities)
    }

    fn get_battery(
        &mut self,
        slot: u8,
        _device: BatteryDevice,
    ) -> Result<RawBattery, TransportError> {
        let inner = self.inner.lock().unwrap();
        if inner.unavailable {
            return Err(TransportError::Unavailable);
        }
        Ok(inner.slots[slot as usize].battery)
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.inner.lock().unwrap().enabled = enabled;
    }
}
