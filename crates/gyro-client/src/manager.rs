//! Connection state machine.
//!
//! [`ConnectionManager`] owns the session, its store and the servo driver,
//! and exposes one method per lifecycle event. It never touches a socket:
//! the transport loop in [`crate::transport`] feeds it, and tests drive it
//! directly.
//!
//! Each inbound frame is handled to completion (session persisted, servos
//! driven) before the method returns, so frames are strictly serialized.

use std::fmt::Display;

use gyro_core::mapper::{servo_angle_alpha, servo_angle_gamma};
use gyro_core::{
    GyroPayload, IdentifyMessage, InboundMessage, MessageError, OrientationSample, PulseRange,
    ServoCommand, Session,
};
use gyro_servo::ServoDriver;
use gyro_settings::SessionPersistence;
use tracing::{debug, error, info, warn};

use crate::errors::{ClientError, DispatchError};
use crate::state::ConnectionState;

/// What handling one inbound frame did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dispatch {
    /// A client id was written to the session store.
    pub client_id_persisted: bool,
    /// Commands sent to the servo driver, alpha first.
    pub commands: Vec<ServoCommand>,
}

/// Relay connection state machine.
pub struct ConnectionManager<P, D> {
    state: ConnectionState,
    session: Session,
    store: P,
    servo: D,
    range: PulseRange,
}

impl<P: SessionPersistence, D: ServoDriver> ConnectionManager<P, D> {
    /// Create a manager in [`ConnectionState::Disconnected`].
    pub fn new(session: Session, store: P, servo: D) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            session,
            store,
            servo,
            range: PulseRange::default(),
        }
    }

    /// Use a non-default pulse range for the angle mapper.
    #[must_use]
    pub fn with_pulse_range(mut self, range: PulseRange) -> Self {
        self.range = range;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Current session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Session store.
    pub fn store(&self) -> &P {
        &self.store
    }

    /// Servo driver.
    pub fn servo(&self) -> &D {
        &self.servo
    }

    /// `Disconnected → Connecting`.
    pub fn begin_connect(&mut self) -> Result<(), ClientError> {
        self.transition(ConnectionState::Disconnected, ConnectionState::Connecting, "connect")
    }

    /// `Connecting → Open`. Returns the identify frame to send.
    pub fn on_open(&mut self) -> Result<IdentifyMessage, ClientError> {
        self.transition(ConnectionState::Connecting, ConnectionState::Open, "open")?;
        let identify = IdentifyMessage::for_session(&self.session);
        info!(
            cmd = ?identify.header.cmd,
            client_id = identify.header.client_id.as_deref(),
            "relay connection open"
        );
        Ok(identify)
    }

    /// Handle one inbound text frame.
    ///
    /// A client id is persisted before any telemetry is applied. A failure
    /// to persist is reported after the servos have been driven.
    pub fn on_message(&mut self, text: &str) -> Result<Dispatch, DispatchError> {
        if self.state != ConnectionState::Open {
            debug!(state = %self.state, "dropping message outside open state");
            return Err(DispatchError::NotOpen(self.state));
        }
        debug!(frame = text, "received");

        let inbound = InboundMessage::parse(text).inspect_err(|e| {
            warn!(error = %e, "ignoring malformed relay message");
        })?;

        let mut dispatch = Dispatch::default();
        let mut persist_error = None;
        if let Some(client_id) = inbound.client_id.as_deref() {
            match self.persist_client_id(client_id) {
                Ok(()) => dispatch.client_id_persisted = true,
                Err(e) => persist_error = Some(e),
            }
        }

        match inbound.gyro {
            GyroPayload::Absent => {}
            GyroPayload::Sample(sample) => dispatch.commands = self.drive(sample),
            GyroPayload::Invalid(reason) => {
                warn!(%reason, "ignoring invalid gyro payload");
                return Err(MessageError::InvalidGyro(reason).into());
            }
        }

        match persist_error {
            Some(e) => Err(e.into()),
            None => Ok(dispatch),
        }
    }

    /// Record a transport failure. The connection is over.
    pub fn on_error(&mut self, err: &dyn Display) {
        error!(error = %err, state = %self.state, "relay connection error");
        self.state = ConnectionState::Closed;
    }

    /// Record the end of the connection.
    pub fn on_close(&mut self, reason: Option<&str>) {
        if self.state.is_terminal() {
            debug!(reason, "relay connection already closed");
        } else {
            info!(reason, "relay connection closed");
        }
        self.state = ConnectionState::Closed;
    }

    fn transition(
        &mut self,
        from: ConnectionState,
        to: ConnectionState,
        action: &'static str,
    ) -> Result<(), ClientError> {
        if self.state != from {
            return Err(ClientError::InvalidState {
                action,
                state: self.state,
            });
        }
        debug!(from = %from, to = %to, "connection state change");
        self.state = to;
        Ok(())
    }

    fn persist_client_id(&mut self, client_id: &str) -> Result<(), gyro_settings::SettingsError> {
        let changed = self.session.assign_client_id(client_id);
        if let Err(e) = self.store.save(&self.session) {
            error!(client_id, error = %e, "failed to persist client id");
            return Err(e);
        }
        if changed {
            info!(client_id, "client id stored");
        }
        Ok(())
    }

    fn drive(&mut self, sample: OrientationSample) -> Vec<ServoCommand> {
        let (alpha, gamma) = self.range.map(sample);
        for command in [alpha, gamma] {
            if let Err(e) = self.servo.apply(command) {
                warn!(channel = %command.channel, error = %e, "servo write failed");
            }
        }
        debug!(
            alpha = servo_angle_alpha(sample.alpha, sample.gamma),
            gamma = servo_angle_gamma(sample.gamma),
            alpha_us = alpha.pulse_width_us,
            gamma_us = gamma.pulse_width_us,
            "servos updated"
        );
        vec![alpha, gamma]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
