//! # gyro-settings
//!
//! The bridge keeps everything in one JSON settings file:
//!
//! ```json
//! {
//!   "token": "long-lived auth token",
//!   "endpoints": {
//!     "relay_token": "http://localhost:8080/api/v1/relays",
//!     "relay_websocket": "ws://localhost:8080/api/v1/relays/%s/ws"
//!   },
//!   "relay": { "relay_token": null, "client_id": null },
//!   "servo": { "alpha_pin": 23, "gamma_pin": 4 }
//! }
//! ```
//!
//! It is split on load into a read-only [`Config`] and a mutable
//! [`Session`](gyro_core::Session) owned by a [`FileSessionStore`]. Only the
//! store writes the file back, and only the `relay` object changes.

#![deny(unsafe_code)]

pub mod config;
pub mod errors;
pub mod loader;
pub mod session;

pub use config::{Config, Endpoints, ServoSettings};
pub use errors::{Result, SettingsError};
pub use loader::{LoadedSettings, load_settings_from_path};
pub use session::{FileSessionStore, MemorySessionStore, SessionPersistence};
