//! Timed force-feedback state for the two vibration motors.
//!
//! Expiry is lazy: nothing schedules a timer, the update cycle asks the
//! state on every tick whether a channel ran out. Channel state survives a
//! disconnect so an unexpired effect resumes when the device comes back.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// The two independently timed motors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorChannel {
    /// Left, low-frequency motor.
    Low,
    /// Right, high-frequency motor.
    High,
}

#[derive(Debug, Clone, Copy, Default)]
struct MotorLane {
    speed: u16,
    expiry: Option<Instant>,
    active: bool,
}

/// Per-pad vibration scheduler.
#[derive(Debug, Clone, Copy, Default)]
pub struct RumbleState {
    low: MotorLane,
    high: MotorLane,
    pending_write: bool,
}

impl RumbleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms one channel: `power` is clamped to [0, 1] and scaled to the
    /// 16-bit motor speed; `Duration::ZERO` is an explicit stop.
    pub fn set(&mut self, channel: MotorChannel, power: f32, duration: Duration, now: Instant) {
        if duration.is_zero() {
            self.stop(channel);
            return;
        }

        let speed = (65535.0 * power.clamp(0.0, 1.0)).round() as u16;
        let lane = self.lane_mut(channel);
        lane.speed = speed;
        lane.expiry = Some(now + duration);
        lane.active = true;
        self.pending_write = true;
        debug!(?channel, speed, ?duration, "rumble armed");
    }

    /// Stops one channel immediately. The other channel keeps its speed
    /// and expiry.
    pub fn stop(&mut self, channel: MotorChannel) {
        let lane = self.lane_mut(channel);
        lane.speed = 0;
        lane.expiry = None;
        lane.active = false;
        self.pending_write = true;
    }

    pub fn stop_all(&mut self) {
        self.stop(MotorChannel::Low);
        self.stop(MotorChannel::High);
    }

    /// Lazy expiry check, called once per update cycle. Returns true when
    /// a channel just expired and the zeroed speed still has to reach the
    /// transport.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut expired = false;
        for channel in [MotorChannel::Low, MotorChannel::High] {
            let lane = self.lane_mut(channel);
            if lane.active && lane.expiry.is_some_and(|at| now >= at) {
                lane.speed = 0;
                lane.expiry = None;
                lane.active = false;
                expired = true;
                debug!(?channel, "rumble expired");
            }
        }
        if expired {
            self.pending_write = true;
        }
        expired
    }

    /// Consumes the "transport write needed" flag. The caller only issues
    /// the write while the device is connected; an armed effect on a
    /// disconnected pad stays pending until reconnect or expiry.
    pub fn take_pending_write(&mut self) -> bool {
        std::mem::take(&mut self.pending_write)
    }

    /// Current `(low, high)` motor speeds as written to the wire.
    pub fn speeds(&self) -> (u16, u16) {
        (self.low.speed, self.high.speed)
    }

    pub fn is_active(&self, channel: MotorChannel) -> bool {
        self.lane(channel).active
    }

    pub fn any_active(&self) -> bool {
        self.low.active || self.high.active
    }

    fn lane(&self, channel: MotorChannel) -> &MotorLane {
        match channel {
            MotorChannel::Low => &self.low,
            MotorChannel::High => &self.high,
        }
    }

    fn lane_mut(&mut self, channel: MotorChannel) -> &mut MotorLane {
        match channel {
            MotorChannel::Low => &mut self.low,
            MotorChannel::High => &mut self.high,
        }
    }
}
