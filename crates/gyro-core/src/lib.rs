//! # gyro-core
//!
//! Foundation types shared by every crate of the gyro relay bridge:
//!
//! - [`types`]: session, orientation samples and servo commands
//! - [`mapper`]: the pure orientation → pulse-width mapping
//! - [`messages`]: the JSON frames exchanged over the relay websocket
//! - [`logging`]: `tracing` subscriber setup and log capture for tests

#![deny(unsafe_code)]

pub mod logging;
pub mod mapper;
pub mod messages;
pub mod types;

pub use mapper::{PulseRange, map};
pub use messages::{GyroPayload, IdentifyCommand, IdentifyMessage, InboundMessage, MessageError};
pub use types::{OrientationSample, ServoChannel, ServoCommand, Session};
