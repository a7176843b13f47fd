//! Raspberry Pi GPIO backend using `rppal` software PWM.

use std::time::Duration;

use gyro_core::ServoChannel;
use rppal::gpio::{Gpio, OutputPin};
use tracing::{debug, warn};

use crate::{PWM_PERIOD_US, ServoDriver, ServoError};

/// Drives two servos with 50 Hz software PWM.
pub struct GpioServoDriver {
    alpha: OutputPin,
    gamma: OutputPin,
}

impl GpioServoDriver {
    /// Claim `alpha_pin` and `gamma_pin` (BCM numbering) as outputs.
    pub fn open(alpha_pin: u8, gamma_pin: u8) -> Result<Self, ServoError> {
        let gpio = Gpio::new().map_err(|e| ServoError::Unavailable(e.to_string()))?;
        let claim = |pin: u8| {
            gpio.get(pin)
                .map(rppal::gpio::Pin::into_output)
                .map_err(|e| ServoError::Gpio {
                    pin,
                    reason: e.to_string(),
                })
        };
        let alpha = claim(alpha_pin)?;
        let gamma = claim(gamma_pin)?;
        debug!(alpha_pin, gamma_pin, "servo pins claimed");
        Ok(Self { alpha, gamma })
    }

    fn pin_mut(&mut self, channel: ServoChannel) -> &mut OutputPin {
        match channel {
            ServoChannel::Alpha => &mut self.alpha,
            ServoChannel::Gamma => &mut self.gamma,
        }
    }
}

impl ServoDriver for GpioServoDriver {
    fn set_pulse_width(
        &mut self,
        channel: ServoChannel,
        pulse_width_us: u32,
    ) -> Result<(), ServoError> {
        let pin = self.pin_mut(channel);
        let bcm = pin.pin();
        pin.set_pwm(
            Duration::from_micros(PWM_PERIOD_US),
            Duration::from_micros(u64::from(pulse_width_us)),
        )
        .map_err(|e| ServoError::Gpio {
            pin: bcm,
            reason: e.to_string(),
        })
    }
}

impl Drop for GpioServoDriver {
    fn drop(&mut self) {
        for pin in [&mut self.alpha, &mut self.gamma] {
            if let Err(e) = pin.clear_pwm() {
                warn!(pin = pin.pin(), error = %e, "failed to stop servo PWM");
            }
        }
    }
}
