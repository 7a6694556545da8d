//! Battery and capability reports decoded from the raw transport structs.

use bitflags::bitflags;

use crate::transport::{RawBattery, RawCapabilities};

/// What powers the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatterySource {
    #[default]
    Disconnected,
    WiredNoBattery,
    Alkaline,
    NiMh,
    Unknown,
}

impl From<u8> for BatterySource {
    fn from(raw: u8) -> Self {
        match raw {
            0x00 => BatterySource::Disconnected,
            0x01 => BatterySource::WiredNoBattery,
            0x02 => BatterySource::Alkaline,
            0x03 => BatterySource::NiMh,
            _ => BatterySource::Unknown,
        }
    }
}

/// Coarse charge level. Only meaningful for wireless devices with a known
/// battery type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ChargeLevel {
    #[default]
    Empty,
    Low,
    Medium,
    Full,
}

impl From<u8> for ChargeLevel {
    fn from(raw: u8) -> Self {
        match raw {
            0x01 => ChargeLevel::Low,
            0x02 => ChargeLevel::Medium,
            0x03 => ChargeLevel::Full,
            _ => ChargeLevel::Empty,
        }
    }
}

/// Last battery report, or the defaults if never refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatteryState {
    pub source: BatterySource,
    pub level: ChargeLevel,
}

impl From<RawBattery> for BatteryState {
    fn from(raw: RawBattery) -> Self {
        Self {
            source: raw.battery_type.into(),
            level: raw.charge_level.into(),
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CapabilityFlags: u16 {
        const FORCE_FEEDBACK = 0x0001;
        const WIRELESS       = 0x0002;
        const VOICE_SUPPORT  = 0x0004;
        const PLUGIN_MODULES = 0x0008;
        const NO_NAVIGATION  = 0x0010;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubType {
    #[default]
    Unknown,
    Gamepad,
    Wheel,
    ArcadeStick,
    FlightStick,
    DancePad,
    Guitar,
    GuitarAlternate,
    DrumKit,
    GuitarBass,
    ArcadePad,
}

impl From<u8> for SubType {
    fn from(raw: u8) -> Self {
        match raw {
            0x01 => SubType::Gamepad,
            0x02 => SubType::Wheel,
            0x03 => SubType::ArcadeStick,
            0x04 => SubType::FlightStick,
            0x05 => SubType::DancePad,
            0x06 => SubType::Guitar,
            0x07 => SubType::GuitarAlternate,
            0x08 => SubType::DrumKit,
            0x0B => SubType::GuitarBass,
            0x13 => SubType::ArcadePad,
            _ => SubType::Unknown,
        }
    }
}

/// Capability report, decoded on explicit request only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub sub_type: SubType,
    pub flags: CapabilityFlags,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            sub_type: SubType::Unknown,
            flags: CapabilityFlags::empty(),
        }
    }
}

impl Capabilities {
    pub fn is_wireless(&self) -> bool {
        self.flags.contains(CapabilityFlags::WIRELESS)
    }

    pub fn has_force_feedback(&self) -> bool {
        self.flags.contains(CapabilityFlags::FORCE_FEEDBACK)
    }

    pub fn has_voice_support(&self) -> bool {
        self.flags.contains(CapabilityFlags::VOICE_SUPPORT)
    }
}

impl From<RawCapabilities> for Capabilities {
    fn from(raw: RawCapabilities) -> Self {
        Self {
            sub_type: raw.sub_type.into(),
            flags: CapabilityFlags::from_bits_truncate(raw.flags),
        }
    }
}
