//! Static, read-only configuration.

use gyro_core::PulseRange;
use gyro_core::mapper::{MAX_PULSE_US, MIN_PULSE_US};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Placeholder substituted with the relay token in the websocket template.
pub const RELAY_TOKEN_PLACEHOLDER: &str = "%s";
/// Named alias for [`RELAY_TOKEN_PLACEHOLDER`].
pub const RELAY_TOKEN_NAMED_PLACEHOLDER: &str = "{relay_token}";

/// Key paths that must exist in every settings file.
pub const REQUIRED_KEYS: &[&[&str]] = &[
    &["token"],
    &["endpoints"],
    &["endpoints", "relay_token"],
    &["endpoints", "relay_websocket"],
    &["relay"],
    &["relay", "relay_token"],
    &["relay", "client_id"],
];

/// Configuration that does not change while the bridge runs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Long-lived token exchanged for a relay token.
    pub token: String,
    /// Remote endpoints.
    pub endpoints: Endpoints,
    /// Servo wiring and pulse range.
    #[serde(default)]
    pub servo: ServoSettings,
}

/// Remote endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// URL of the relay-token issuing service.
    pub relay_token: String,
    /// Websocket URL template containing the relay token placeholder.
    pub relay_websocket: String,
}

impl Endpoints {
    /// Resolve the websocket URL for a relay token.
    pub fn websocket_url(&self, relay_token: &str) -> Result<String> {
        let template = &self.relay_websocket;
        if template.contains(RELAY_TOKEN_PLACEHOLDER) {
            Ok(template.replacen(RELAY_TOKEN_PLACEHOLDER, relay_token, 1))
        } else if template.contains(RELAY_TOKEN_NAMED_PLACEHOLDER) {
            Ok(template.replacen(RELAY_TOKEN_NAMED_PLACEHOLDER, relay_token, 1))
        } else {
            Err(SettingsError::InvalidValue(format!(
                "endpoints.relay_websocket has no relay token placeholder: {template}"
            )))
        }
    }
}

/// Servo wiring (BCM pin numbers) and pulse range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServoSettings {
    /// GPIO pin driving the alpha servo.
    pub alpha_pin: u8,
    /// GPIO pin driving the gamma servo.
    pub gamma_pin: u8,
    /// Pulse width at 180°.
    pub min_pulse_us: u32,
    /// Pulse width at 0°.
    pub max_pulse_us: u32,
}

impl Default for ServoSettings {
    fn default() -> Self {
        Self {
            alpha_pin: 23,
            gamma_pin: 4,
            min_pulse_us: MIN_PULSE_US,
            max_pulse_us: MAX_PULSE_US,
        }
    }
}

impl ServoSettings {
    /// Pulse range for the angle mapper.
    pub fn pulse_range(&self) -> PulseRange {
        PulseRange {
            min_us: self.min_pulse_us,
            max_us: self.max_pulse_us,
        }
    }
}

impl Config {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let servo = &self.servo;
        if servo.min_pulse_us >= servo.max_pulse_us {
            return Err(SettingsError::InvalidValue(format!(
                "servo.min_pulse_us ({}) must be below servo.max_pulse_us ({})",
                servo.min_pulse_us, servo.max_pulse_us
            )));
        }
        if servo.alpha_pin == servo.gamma_pin {
            return Err(SettingsError::InvalidValue(format!(
                "servo.alpha_pin and servo.gamma_pin are both {}",
                servo.alpha_pin
            )));
        }
        let _ = self.endpoints.websocket_url("")?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
