//! In-memory servo backend.

use std::sync::Arc;

use gyro_core::{ServoChannel, ServoCommand};
use parking_lot::Mutex;
use tracing::info;

use crate::{ServoDriver, ServoError};

/// Records every command instead of driving hardware.
///
/// Clones share one history. Used by `--dry-run` and by tests.
#[derive(Clone, Debug, Default)]
pub struct RecordingServoDriver {
    commands: Arc<Mutex<Vec<ServoCommand>>>,
}

impl RecordingServoDriver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command received so far, oldest first.
    pub fn commands(&self) -> Vec<ServoCommand> {
        self.commands.lock().clone()
    }

    /// Latest pulse width sent to `channel`.
    pub fn last_pulse(&self, channel: ServoChannel) -> Option<u32> {
        self.commands
            .lock()
            .iter()
            .rev()
            .find(|c| c.channel == channel)
            .map(|c| c.pulse_width_us)
    }
}

impl ServoDriver for RecordingServoDriver {
    fn set_pulse_width(
        &mut self,
        channel: ServoChannel,
        pulse_width_us: u32,
    ) -> Result<(), ServoError> {
        info!(%channel, pulse_width_us, "servo pulse (dry run)");
        self.commands.lock().push(ServoCommand {
            channel,
            pulse_width_us,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let recorder = RecordingServoDriver::new();
        let mut driver = recorder.clone();
        driver.set_pulse_width(ServoChannel::Alpha, 900).unwrap();
        driver.set_pulse_width(ServoChannel::Gamma, 1500).unwrap();
        driver.set_pulse_width(ServoChannel::Alpha, 1000).unwrap();

        assert_eq!(recorder.commands().len(), 3);
        assert_eq!(recorder.last_pulse(ServoChannel::Alpha), Some(1000));
        assert_eq!(recorder.last_pulse(ServoChannel::Gamma), Some(1500));
    }

    #[test]
    fn empty_recorder_has_no_pulse() {
        assert_eq!(RecordingServoDriver::new().last_pulse(ServoChannel::Gamma), None);
    }
}
