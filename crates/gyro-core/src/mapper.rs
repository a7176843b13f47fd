//! Orientation → servo pulse-width mapping.
//!
//! Both channels use the same inverted linear interpolation over 0–180°:
//! 0° maps to the longest pulse, 180° to the shortest.
//!
//! Gamma is shifted by +180° when negative. Alpha is mirrored around 180°
//! or 360° depending on the sign of the *raw* gamma, before any shift.
//! Everything outside 0–180° is clamped, never rejected.

use crate::types::{OrientationSample, ServoChannel, ServoCommand};

/// Shortest pulse width accepted by the servos, in microseconds.
pub const MIN_PULSE_US: u32 = 500;
/// Longest pulse width accepted by the servos, in microseconds.
pub const MAX_PULSE_US: u32 = 2500;
/// Lower bound of the servo travel, in degrees.
pub const MIN_ANGLE: f64 = 0.0;
/// Upper bound of the servo travel, in degrees.
pub const MAX_ANGLE: f64 = 180.0;

/// Pulse-width endpoints of the servo travel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PulseRange {
    /// Pulse width at [`MAX_ANGLE`].
    pub min_us: u32,
    /// Pulse width at [`MIN_ANGLE`].
    pub max_us: u32,
}

impl Default for PulseRange {
    fn default() -> Self {
        Self {
            min_us: MIN_PULSE_US,
            max_us: MAX_PULSE_US,
        }
    }
}

impl PulseRange {
    /// Unrounded pulse width for a servo angle. The angle is clamped first.
    pub fn pulse_width_for_angle(&self, angle: f64) -> f64 {
        let angle = clamp_angle(angle);
        let span = f64::from(self.max_us) - f64::from(self.min_us);
        f64::from(self.max_us) - span / (MAX_ANGLE - MIN_ANGLE) * (angle - MIN_ANGLE)
    }

    /// Build the command for one channel, rounded to whole microseconds.
    ///
    /// The result always lies between the two endpoints, even when
    /// `min_us > max_us`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn command(&self, channel: ServoChannel, angle: f64) -> ServoCommand {
        let lo = self.min_us.min(self.max_us);
        let hi = self.min_us.max(self.max_us);
        let pulse = self
            .pulse_width_for_angle(angle)
            .round()
            .clamp(f64::from(lo), f64::from(hi));
        ServoCommand {
            channel,
            pulse_width_us: pulse as u32,
        }
    }

    /// Map a sample to `(alpha, gamma)` commands.
    pub fn map(&self, sample: OrientationSample) -> (ServoCommand, ServoCommand) {
        let gamma = servo_angle_gamma(sample.gamma);
        let alpha = servo_angle_alpha(sample.alpha, sample.gamma);
        (
            self.command(ServoChannel::Alpha, alpha),
            self.command(ServoChannel::Gamma, gamma),
        )
    }
}

/// Map a sample to `(alpha, gamma)` commands over the default 500–2500µs range.
pub fn map(sample: OrientationSample) -> (ServoCommand, ServoCommand) {
    PulseRange::default().map(sample)
}

/// Servo angle for the gamma channel, clamped to 0–180°.
pub fn servo_angle_gamma(gamma: f64) -> f64 {
    let shifted = if gamma < 0.0 { gamma + 180.0 } else { gamma };
    clamp_angle(shifted)
}

/// Servo angle for the alpha channel, clamped to 0–180°.
///
/// Branches on the raw gamma sign, not on the shifted value.
pub fn servo_angle_alpha(alpha: f64, raw_gamma: f64) -> f64 {
    let mirrored = if raw_gamma < 0.0 {
        180.0 - alpha
    } else {
        360.0 - alpha
    };
    clamp_angle(mirrored)
}

fn clamp_angle(angle: f64) -> f64 {
    if angle.is_nan() {
        return MIN_ANGLE;
    }
    angle.clamp(MIN_ANGLE, MAX_ANGLE)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample(alpha: f64, gamma: f64) -> OrientationSample {
        OrientationSample { alpha, gamma }
    }

    #[test]
    fn gamma_90_is_center() {
        let (_, gamma) = map(sample(0.0, 90.0));
        assert_eq!(gamma.channel, ServoChannel::Gamma);
        assert_eq!(gamma.pulse_width_us, 1500);
    }

    #[test]
    fn negative_gamma_is_shifted() {
        let range = PulseRange::default();
        let exact = range.pulse_width_for_angle(servo_angle_gamma(-30.0));
        assert!((exact - 833.333).abs() < 0.001, "got {exact}");

        let (_, gamma) = map(sample(0.0, -30.0));
        assert_eq!(gamma.pulse_width_us, 833);
    }

    #[test]
    fn negative_gamma_mirrors_alpha_around_180() {
        // 180 - 100 = 80° → 2500 - 2000/180 * 80 ≈ 1611.1
        let (alpha, _) = map(sample(100.0, -30.0));
        assert_eq!(alpha.channel, ServoChannel::Alpha);
        assert_eq!(alpha.pulse_width_us, 1611);
    }

    #[test]
    fn positive_gamma_mirrors_alpha_around_360() {
        // 360 - 300 = 60° → 2500 - 2000/180 * 60 ≈ 1833.3
        let (alpha, _) = map(sample(300.0, 90.0));
        assert_eq!(alpha.pulse_width_us, 1833);
    }

    #[test]
    fn positive_gamma_small_alpha_clamps_to_180() {
        // 360 - 10 = 350° → clamped to 180°
        let (alpha, _) = map(sample(10.0, 45.0));
        assert_eq!(alpha.pulse_width_us, 500);
    }

    #[test]
    fn zero_gamma_takes_positive_branch() {
        assert!((servo_angle_alpha(270.0, 0.0) - 90.0).abs() < f64::EPSILON);
        assert!(servo_angle_gamma(0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn gamma_above_range_clamps() {
        let (_, gamma) = map(sample(0.0, 200.0));
        assert_eq!(gamma.pulse_width_us, 500);
    }

    #[test]
    fn gamma_below_range_clamps() {
        // -250 + 180 = -70 → clamped to 0°
        let (_, gamma) = map(sample(0.0, -250.0));
        assert_eq!(gamma.pulse_width_us, 2500);
    }

    #[test]
    fn nan_is_treated_as_zero_degrees() {
        let (alpha, gamma) = map(sample(f64::NAN, f64::NAN));
        assert_eq!(gamma.pulse_width_us, 2500);
        assert_eq!(alpha.pulse_width_us, 2500);
    }

    #[test]
    fn custom_range_interpolates() {
        let range = PulseRange {
            min_us: 1000,
            max_us: 2000,
        };
        assert_eq!(range.command(ServoChannel::Gamma, 0.0).pulse_width_us, 2000);
        assert_eq!(range.command(ServoChannel::Gamma, 90.0).pulse_width_us, 1500);
        assert_eq!(range.command(ServoChannel::Gamma, 180.0).pulse_width_us, 1000);
    }

    #[test]
    fn inverted_range_does_not_panic() {
        let range = PulseRange {
            min_us: 2500,
            max_us: 500,
        };
        assert_eq!(range.command(ServoChannel::Gamma, 90.0).pulse_width_us, 1500);
        assert_eq!(range.command(ServoChannel::Gamma, 0.0).pulse_width_us, 500);
        assert_eq!(range.command(ServoChannel::Gamma, 180.0).pulse_width_us, 2500);
        let (alpha, gamma) = range.map(sample(f64::NAN, 400.0));
        assert_eq!(alpha.pulse_width_us, 500);
        assert_eq!(gamma.pulse_width_us, 2500);
    }

    #[test]
    fn degenerate_range_pins_every_angle() {
        let range = PulseRange {
            min_us: 1500,
            max_us: 1500,
        };
        assert_eq!(range.command(ServoChannel::Alpha, 0.0).pulse_width_us, 1500);
        assert_eq!(range.command(ServoChannel::Alpha, 180.0).pulse_width_us, 1500);
    }

    #[test]
    fn mapping_is_deterministic() {
        let s = sample(123.4, -56.7);
        assert_eq!(map(s), map(s));
    }

    proptest! {
        #[test]
        fn gamma_pulse_stays_in_range(gamma in -180.0f64..=180.0, alpha in -720.0f64..720.0) {
            let (a, g) = map(sample(alpha, gamma));
            prop_assert!((MIN_PULSE_US..=MAX_PULSE_US).contains(&g.pulse_width_us));
            prop_assert!((MIN_PULSE_US..=MAX_PULSE_US).contains(&a.pulse_width_us));
        }

        #[test]
        fn pulse_is_non_increasing_in_angle(a in -10.0f64..190.0, b in -10.0f64..190.0) {
            let range = PulseRange::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(range.pulse_width_for_angle(lo) >= range.pulse_width_for_angle(hi));
            prop_assert!(
                range.command(ServoChannel::Gamma, lo).pulse_width_us
                    >= range.command(ServoChannel::Gamma, hi).pulse_width_us
            );
        }
    }
}
