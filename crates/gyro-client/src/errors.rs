//! Connection and dispatch errors.

use gyro_core::MessageError;
use gyro_settings::SettingsError;
use thiserror::Error;

use crate::state::ConnectionState;

/// Errors that end (or prevent) a relay connection.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Websocket handshake failed.
    #[error("failed to connect to relay: {0}")]
    Connect(String),
    /// The socket failed after opening.
    #[error("relay transport error: {0}")]
    Transport(String),
    /// Sending a frame failed.
    #[error("failed to send to relay: {0}")]
    Send(String),
    /// Lifecycle call made from the wrong state.
    #[error("cannot {action} while {state}")]
    InvalidState {
        /// Attempted transition.
        action: &'static str,
        /// Current state.
        state: ConnectionState,
    },
}

/// Why an inbound frame was not (fully) applied.
///
/// None of these close the connection.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Frame could not be interpreted.
    #[error(transparent)]
    Malformed(#[from] MessageError),
    /// A new client id could not be persisted.
    #[error("failed to persist client id: {0}")]
    Persist(#[from] SettingsError),
    /// Frame arrived while the connection was not open.
    #[error("message dropped while {0}")]
    NotOpen(ConnectionState),
}
