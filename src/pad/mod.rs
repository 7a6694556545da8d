//! Per-slot gamepad state.
//!
//! 1. [`button`] - Bitmask and edge detection
//! 2. [`axis`] - Deadzone-corrected analog values
//! 3. [`rumble`] - Timed force-feedback channels
//! 4. [`battery`] - Battery and capability decode
//! 5. [`gamepad`] - The slot state and its differential update cycle
//!
//! Everything here is owned and mutated by the polling task alone;
//! concurrent readers get [`gamepad::PadSnapshot`] values published through
//! the hub's watch channels.

pub mod axis;
pub mod battery;
pub mod button;
pub mod gamepad;
pub mod rumble;

pub use button::{Buttons, Transition};
pub use gamepad::{Gamepad, PadSnapshot, MAX_SLOTS};
pub use rumble::MotorChannel;
