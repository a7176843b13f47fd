//! # gyro-servo
//!
//! Servo output behind the [`ServoDriver`] trait.
//!
//! - [`GpioServoDriver`]: software PWM on two Raspberry Pi GPIO pins (Linux)
//! - [`RecordingServoDriver`]: keeps every command in memory, for tests and
//!   dry runs
//!
//! Drivers do not validate pulse widths; the angle mapper already clamps.

#![deny(unsafe_code)]

#[cfg(target_os = "linux")]
pub mod gpio;
pub mod recording;

#[cfg(target_os = "linux")]
pub use gpio::GpioServoDriver;
pub use recording::RecordingServoDriver;

use gyro_core::{ServoChannel, ServoCommand};
use thiserror::Error;

/// Servo PWM period (50 Hz), in microseconds.
pub const PWM_PERIOD_US: u64 = 20_000;

/// Errors from a servo backend.
#[derive(Debug, Error)]
pub enum ServoError {
    /// The GPIO layer refused the operation.
    #[error("gpio error on pin {pin}: {reason}")]
    Gpio {
        /// BCM pin number.
        pin: u8,
        /// Underlying error message.
        reason: String,
    },
    /// Backend is not available on this platform.
    #[error("servo backend unavailable: {0}")]
    Unavailable(String),
}

/// Sets servo pulse widths.
pub trait ServoDriver {
    /// Drive `channel` with a pulse of `pulse_width_us` microseconds.
    fn set_pulse_width(&mut self, channel: ServoChannel, pulse_width_us: u32)
    -> Result<(), ServoError>;

    /// Apply a mapped command.
    fn apply(&mut self, command: ServoCommand) -> Result<(), ServoError> {
        self.set_pulse_width(command.channel, command.pulse_width_us)
    }
}

impl<D: ServoDriver + ?Sized> ServoDriver for Box<D> {
    fn set_pulse_width(
        &mut self,
        channel: ServoChannel,
        pulse_width_us: u32,
    ) -> Result<(), ServoError> {
        (**self).set_pulse_width(channel, pulse_width_us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boxed_driver_forwards_commands() {
        let recorder = RecordingServoDriver::new();
        let mut boxed: Box<dyn ServoDriver + Send> = Box::new(recorder.clone());
        boxed
            .apply(ServoCommand {
                channel: ServoChannel::Gamma,
                pulse_width_us: 1500,
            })
            .unwrap();
        assert_eq!(recorder.commands().len(), 1);
    }

    #[test]
    fn gpio_error_display() {
        let err = ServoError::Gpio {
            pin: 4,
            reason: "busy".into(),
        };
        assert_eq!(err.to_string(), "gpio error on pin 4: busy");
    }
}
