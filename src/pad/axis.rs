//! Analog axis normalization with deadzone suppression.
//!
//! The deadzone test runs on the raw integer pair, not the normalized
//! values; the divisor is always 32768 for sticks and 255 for triggers.
//! Numeric compatibility with the original wrapper depends on keeping it
//! exactly that way.

/// Circular deadzone: (0, 0) while the raw magnitude is inside the radius,
/// otherwise a straight division by 32768.
pub fn stick_normalized(raw_x: i16, raw_y: i16, dead_zone_radius: u32) -> (f32, f32) {
    if in_dead_zone(raw_x, raw_y, dead_zone_radius) {
        (0.0, 0.0)
    } else {
        (raw_x as f32 / 32768.0, raw_y as f32 / 32768.0)
    }
}

/// Linear threshold for the 8-bit triggers: values at or below the
/// threshold read as zero.
pub fn trigger_normalized(raw: u8, threshold: u8) -> f32 {
    if raw > threshold {
        raw as f32 / 255.0
    } else {
        0.0
    }
}

fn in_dead_zone(raw_x: i16, raw_y: i16, dead_zone_radius: u32) -> bool {
    let x = raw_x as f64;
    let y = raw_y as f64;
    (dead_zone_radius as f64) > (x * x + y * y).sqrt()
}

/// One thumbstick: last raw pair plus its configured deadzone radius.
#[derive(Debug, Clone, Copy)]
pub struct StickState {
    pub x: i16,
    pub y: i16,
    pub dead_zone_radius: u32,
}

impl StickState {
    pub fn new(dead_zone_radius: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            dead_zone_radius,
        }
    }

    pub fn set_raw(&mut self, x: i16, y: i16) {
        self.x = x;
        self.y = y;
    }

    pub fn normalized(&self) -> (f32, f32) {
        stick_normalized(self.x, self.y, self.dead_zone_radius)
    }

    pub fn magnitude(&self) -> f32 {
        let (nx, ny) = self.normalized();
        (nx * nx + ny * ny).sqrt()
    }

    /// Approximate magnitude without a square root.
    /// Least-square fit with zero median, max error 0.0816.
    pub fn magnitude_fast(&self) -> f32 {
        const ALPHA: f32 = 0.948_059;
        const BETA: f32 = 0.392_699;

        let (nx, ny) = self.normalized();
        let xa = nx.abs();
        let ya = ny.abs();
        if xa > ya {
            ALPHA * xa + BETA * ya
        } else {
            ALPHA * ya + BETA * xa
        }
    }
}

/// One trigger: last raw byte plus its configured threshold.
#[derive(Debug, Clone, Copy)]
pub struct TriggerState {
    pub value: u8,
    pub threshold: u8,
}

impl TriggerState {
    pub fn new(threshold: u8) -> Self {
        Self {
            value: 0,
            threshold,
        }
    }

    pub fn set_raw(&mut self, value: u8) {
        self.value = value;
    }

    pub fn normalized(&self) -> f32 {
        trigger_normalized(self.value, self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Default XInput radii, used here as representative values.
    const LEFT_DEAD_ZONE: u32 = 7849;

    #[test]
    fn inside_dead_zone_reads_zero_regardless_of_sign() {
        for (x, y) in [(0, 0), (500, -500), (-5000, 100), (100, 5000)] {
            assert_eq!(stick_normalized(x, y, LEFT_DEAD_ZONE), (0.0, 0.0));
        }
    }

    #[test]
    fn outside_dead_zone_divides_by_32768() {
        let (nx, ny) = stick_normalized(16384, -16384, LEFT_DEAD_ZONE);
        assert_eq!(nx, 0.5);
        assert_eq!(ny, -0.5);
    }

    #[test]
    fn dead_zone_uses_raw_euclidean_magnitude() {
        // Each component is below the radius but the pair is not.
        let radius = 7849;
        let component = 6000;
        let magnitude = ((component as f64).powi(2) * 2.0).sqrt();
        assert!(magnitude > radius as f64);

        let (nx, ny) = stick_normalized(component, component, radius);
        assert!(nx > 0.0 && ny > 0.0);
    }

    #[test]
    fn boundary_is_exclusive_below_radius() {
        // Magnitude exactly equal to the radius is NOT inside the zone.
        let (nx, _) = stick_normalized(7849, 0, 7849);
        assert!(nx > 0.0);
        let (nx, _) = stick_normalized(7848, 0, 7849);
        assert_eq!(nx, 0.0);
    }

    #[test]
    fn trigger_threshold_and_scale() {
        assert_eq!(trigger_normalized(20, 30), 0.0);
        assert_eq!(trigger_normalized(30, 30), 0.0);
        let n = trigger_normalized(200, 30);
        assert!((n - 0.784).abs() < 0.001);
        let full = trigger_normalized(255, 30);
        assert_eq!(full, 1.0);
    }

    #[test]
    fn stick_state_tracks_raw_values() {
        let mut stick = StickState::new(LEFT_DEAD_ZONE);
        stick.set_raw(-32768, 32767);
        assert_eq!(stick.normalized().0, -1.0);
        assert!(stick.magnitude() > 1.0);
        assert!((stick.magnitude_fast() - stick.magnitude()).abs() < 0.09);
    }
}
