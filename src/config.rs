//! Settings for the hub and the per-pad analog tuning.
//!
//! Defaults carry the stock XInput deadzone constants. Both structs
//! round-trip through TOML so a deployment can ship a config file next to
//! the binary.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Per-pad analog tuning and event policy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PadSettings {
    /// Circular deadzone radius for the left stick, in raw axis units.
    pub left_stick_dead_zone: u32,
    /// Circular deadzone radius for the right stick, in raw axis units.
    pub right_stick_dead_zone: u32,
    pub left_trigger_threshold: u8,
    pub right_trigger_threshold: u8,
    /// When set, held buttons are re-reported in the KeyDown mask on every
    /// tick instead of only on the press edge.
    pub key_down_every_tick: bool,
}

impl Default for PadSettings {
    fn default() -> Self {
        Self {
            left_stick_dead_zone: 7849,
            right_stick_dead_zone: 8689,
            left_trigger_threshold: 30,
            right_trigger_threshold: 30,
            key_down_every_tick: false,
        }
    }
}

/// Hub-wide settings: which slots to poll and how fast.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HubSettings {
    /// Poll passes per second. The inter-pass delay is `1000 / this` ms.
    pub updates_per_second: u32,
    /// Slot indices to poll, in order. Each must be in 0..=3.
    pub slots: Vec<u8>,
    /// Buffer size of the event and command channels.
    pub channel_capacity: usize,
    pub pad: PadSettings,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            updates_per_second: 30,
            slots: vec![0],
            channel_capacity: 256,
            pad: PadSettings::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl HubSettings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let settings: HubSettings = toml::from_str(&raw)?;
        info!(path = %path.as_ref().display(), "loaded hub settings");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_xinput_constants() {
        let pad = PadSettings::default();
        assert_eq!(pad.left_stick_dead_zone, 7849);
        assert_eq!(pad.right_stick_dead_zone, 8689);
        assert_eq!(pad.left_trigger_threshold, 30);
        assert_eq!(pad.right_trigger_threshold, 30);
        assert!(!pad.key_down_every_tick);

        let hub = HubSettings::default();
        assert_eq!(hub.updates_per_second, 30);
        assert_eq!(hub.slots, vec![0]);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let settings: HubSettings = toml::from_str(
            r#"
            updates_per_second = 60
            slots = [0, 1]

            [pad]
            left_stick_dead_zone = 4000
            "#,
        )
        .unwrap();
        assert_eq!(settings.updates_per_second, 60);
        assert_eq!(settings.slots, vec![0, 1]);
        assert_eq!(settings.pad.left_stick_dead_zone, 4000);
        // Untouched fields keep their defaults.
        assert_eq!(settings.pad.right_stick_dead_zone, 8689);
        assert_eq!(settings.channel_capacity, 256);
    }

    #[test]
    fn settings_round_trip_through_toml() {
        let mut settings = HubSettings::default();
        settings.slots = vec![0, 2, 3];
        settings.pad.key_down_every_tick = true;

        let raw = toml::to_string(&settings).unwrap();
        let parsed: HubSettings = toml::from_str(&raw).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn load_reads_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("padhub.toml");
        std::fs::write(&path, "updates_per_second = 120\n").unwrap();

        let settings = HubSettings::load(&path).unwrap();
        assert_eq!(settings.updates_per_second, 120);

        assert!(HubSettings::load(dir.path().join("missing.toml")).is_err());
    }
}
