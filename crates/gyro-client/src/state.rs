//! Connection lifecycle states.

use std::fmt;

/// Lifecycle of one relay connection.
///
/// `Disconnected → Connecting → Open → Closed`. `Closed` is terminal for
/// the run; reconnecting means building a new manager.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// Nothing attempted yet.
    #[default]
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Identify frame sent; telemetry flows.
    Open,
    /// Connection ended.
    Closed,
}

impl ConnectionState {
    /// Lowercase state name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    /// Whether no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        self == Self::Closed
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
