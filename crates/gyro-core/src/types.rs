//! Core data model.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Relay session state persisted between runs.
///
/// `client_id` is assigned by the relay server and is never cleared once
/// known. `relay_token` is reused across restarts once acquired.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Short-lived token scoping the websocket connection.
    pub relay_token: Option<String>,
    /// Server-issued identifier used to resume the logical session.
    pub client_id: Option<String>,
}

impl Session {
    /// Whether the session can ask the relay to resume (`reconnect`)
    /// rather than start over (`connect`).
    pub fn can_resume(&self) -> bool {
        self.relay_token.is_some() && self.client_id.is_some()
    }

    /// Record a server-assigned client id.
    ///
    /// Returns `true` if the stored value changed.
    pub fn assign_client_id(&mut self, client_id: &str) -> bool {
        if self.client_id.as_deref() == Some(client_id) {
            return false;
        }
        self.client_id = Some(client_id.to_string());
        true
    }
}

/// One orientation telemetry sample, in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientationSample {
    /// Rotation around the z axis.
    pub alpha: f64,
    /// Left-to-right tilt.
    pub gamma: f64,
}

/// Servo output channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ServoChannel {
    /// Servo following the alpha angle.
    Alpha,
    /// Servo following the gamma angle.
    Gamma,
}

impl ServoChannel {
    /// Lowercase channel name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alpha => "alpha",
            Self::Gamma => "gamma",
        }
    }
}

impl fmt::Display for ServoChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pulse width to apply on one servo channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServoCommand {
    /// Target channel.
    pub channel: ServoChannel,
    /// PWM high time in microseconds.
    pub pulse_width_us: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
