//! # gyro-client
//!
//! Relay websocket connection.
//!
//! [`ConnectionManager`] is the state machine: identify on open, persist
//! server-assigned client ids, and turn gyro telemetry into servo commands.
//! [`run`] drives it over a real socket. There is no automatic reconnect;
//! once the connection closes, `run` returns.

#![deny(unsafe_code)]

pub mod errors;
pub mod manager;
pub mod state;
pub mod transport;

pub use errors::{ClientError, DispatchError};
pub use manager::{ConnectionManager, Dispatch};
pub use state::ConnectionState;
pub use transport::run;
