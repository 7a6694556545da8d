//! Typed events emitted by the polling loop.

use chrono::{DateTime, Local};

use crate::pad::button::Buttons;

/// What one update cycle observed on one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadEventKind {
    /// The device appeared or vanished.
    ConnectionChanged { connected: bool },
    /// The transport packet number moved, i.e. some raw field changed.
    StateChanged { packet_number: u32 },
    /// Every button that went down this tick, as one combined mask.
    KeyDown { buttons: Buttons },
    /// Every button that went up this tick, as one combined mask.
    KeyUp { buttons: Buttons },
}

/// One event as delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadEvent {
    pub slot: u8,
    pub at: DateTime<Local>,
    pub kind: PadEventKind,
}

impl PadEvent {
    pub fn now(slot: u8, kind: PadEventKind) -> Self {
        Self {
            slot,
            at: Local::now(),
            kind,
        }
    }
}
