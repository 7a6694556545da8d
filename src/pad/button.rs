//! Digital button bitmask and per-button edge detection.

use bitflags::bitflags;

bitflags! {
    /// XInput button layout of the raw `wButtons` word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Buttons: u16 {
        const DPAD_UP    = 0x0001;
        const DPAD_DOWN  = 0x0002;
        const DPAD_LEFT  = 0x0004;
        const DPAD_RIGHT = 0x0008;
        const START      = 0x0010;
        const BACK       = 0x0020;
        const LEFT_THUMB  = 0x0040;
        const RIGHT_THUMB = 0x0080;
        const LEFT_BUMPER  = 0x0100;
        const RIGHT_BUMPER = 0x0200;
        const A = 0x1000;
        const B = 0x2000;
        const X = 0x4000;
        const Y = 0x8000;
    }
}

impl Buttons {
    /// Human-readable name of a single-bit mask.
    pub fn name(self) -> &'static str {
        match self {
            Buttons::DPAD_UP => "Dpad_Up",
            Buttons::DPAD_DOWN => "Dpad_Down",
            Buttons::DPAD_LEFT => "Dpad_Left",
            Buttons::DPAD_RIGHT => "Dpad_Right",
            Buttons::START => "Start",
            Buttons::BACK => "Back",
            Buttons::LEFT_THUMB => "Left_ThumbStick",
            Buttons::RIGHT_THUMB => "Right_ThumbStick",
            Buttons::LEFT_BUMPER => "Left_ShoulderBumper",
            Buttons::RIGHT_BUMPER => "Right_ShoulderBumper",
            Buttons::A => "Button_A",
            Buttons::B => "Button_B",
            Buttons::X => "Button_X",
            Buttons::Y => "Button_Y",
            _ => "No_Button",
        }
    }
}

/// Outcome of one edge scan for one button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    Down,
    Up,
}

/// One tracked button: its mask bit and the level as of the last completed
/// update cycle.
#[derive(Debug, Clone)]
pub struct ButtonState {
    pub mask: Buttons,
    pub pressed: bool,
}

impl ButtonState {
    pub fn new(mask: Buttons) -> Self {
        Self {
            mask,
            pressed: false,
        }
    }

    /// Compares the new bitmask level against the stored level.
    ///
    /// The stored `pressed` flag is the single source of truth for edge
    /// detection; two raw masks are never compared wholesale, so several
    /// buttons changing in the same tick each report their own transition.
    pub fn update(&mut self, buttons: Buttons) -> Transition {
        let has_bit = buttons.contains(self.mask);
        if has_bit == self.pressed {
            return Transition::None;
        }

        self.pressed = has_bit;
        if has_bit {
            Transition::Down
        } else {
            Transition::Up
        }
    }
}
