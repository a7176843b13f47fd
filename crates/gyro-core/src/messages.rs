//! JSON frames exchanged with the relay over the websocket.
//!
//! Outbound, the bridge only ever sends one identify frame per connection:
//!
//! ```json
//! {"header": {"cmd": "connect", "client_id": null}, "contents": null}
//! ```
//!
//! Inbound frames are loosely shaped. Any of them may carry
//! `header.client_id`, telemetry under `contents.gyro`, both, or neither.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::types::{OrientationSample, Session};

/// Errors for inbound frames that cannot be interpreted at all.
#[derive(Debug, Error)]
pub enum MessageError {
    /// Frame is not valid JSON.
    #[error("invalid message JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Frame is JSON but not an object.
    #[error("message is not a JSON object")]
    NotAnObject,
    /// `contents.gyro` is present but unusable.
    #[error("invalid gyro payload: {0}")]
    InvalidGyro(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Outbound
// ─────────────────────────────────────────────────────────────────────────────

/// Identify command sent right after the socket opens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifyCommand {
    /// Start a fresh logical session.
    Connect,
    /// Resume the session named by `client_id`.
    Reconnect,
}

/// Header of the identify frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IdentifyHeader {
    /// Connect or reconnect.
    pub cmd: IdentifyCommand,
    /// Known client id, `null` on a fresh connect.
    pub client_id: Option<String>,
}

/// The identify frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IdentifyMessage {
    /// Command header.
    pub header: IdentifyHeader,
    /// Always `null`.
    pub contents: Option<Value>,
}

impl IdentifyMessage {
    /// Build the frame for the current session state.
    pub fn for_session(session: &Session) -> Self {
        let header = if session.can_resume() {
            IdentifyHeader {
                cmd: IdentifyCommand::Reconnect,
                client_id: session.client_id.clone(),
            }
        } else {
            IdentifyHeader {
                cmd: IdentifyCommand::Connect,
                client_id: None,
            }
        };
        Self {
            header,
            contents: None,
        }
    }

    /// Serialize to the wire representation.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inbound
// ─────────────────────────────────────────────────────────────────────────────

/// Telemetry part of an inbound frame.
#[derive(Clone, Debug, PartialEq)]
pub enum GyroPayload {
    /// No `contents`, `contents: null`, no `gyro`, or no `gamma`.
    Absent,
    /// A usable sample.
    Sample(OrientationSample),
    /// `gyro` was present but could not be read.
    Invalid(String),
}

/// A parsed inbound frame.
#[derive(Clone, Debug, PartialEq)]
pub struct InboundMessage {
    /// `header.client_id`, when it is a string.
    pub client_id: Option<String>,
    /// `contents.gyro`.
    pub gyro: GyroPayload,
}

impl InboundMessage {
    /// Parse a text frame.
    ///
    /// Only fails when the frame is not a JSON object. A broken gyro payload
    /// is reported through [`GyroPayload::Invalid`] so that a client id in
    /// the same frame is still honored.
    pub fn parse(text: &str) -> Result<Self, MessageError> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(map) = value else {
            return Err(MessageError::NotAnObject);
        };

        let client_id = map
            .get("header")
            .and_then(|h| h.get("client_id"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let gyro = match map.get("contents") {
            None | Some(Value::Null) => GyroPayload::Absent,
            Some(contents) => parse_gyro(contents.get("gyro")),
        };

        Ok(Self { client_id, gyro })
    }
}

fn parse_gyro(gyro: Option<&Value>) -> GyroPayload {
    let Some(gyro) = gyro.filter(|g| !g.is_null()) else {
        return GyroPayload::Absent;
    };
    if !gyro.is_object() {
        return GyroPayload::Invalid("gyro is not an object".into());
    }
    let Some(gamma) = gyro.get("gamma") else {
        return GyroPayload::Absent;
    };
    let Some(gamma) = gamma.as_f64() else {
        return GyroPayload::Invalid(format!("gamma is not a number: {gamma}"));
    };
    let Some(alpha) = gyro.get("alpha").and_then(Value::as_f64) else {
        return GyroPayload::Invalid("alpha is missing or not a number".into());
    };
    GyroPayload::Sample(OrientationSample { alpha, gamma })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn identify_connect_for_empty_session() {
        let msg = IdentifyMessage::for_session(&Session::default());
        let value: Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"header": {"cmd": "connect", "client_id": null}, "contents": null})
        );
    }

    #[test]
    fn identify_connect_when_token_missing() {
        let session = Session {
            relay_token: None,
            client_id: Some("c1".into()),
        };
        let msg = IdentifyMessage::for_session(&session);
        assert_eq!(msg.header.cmd, IdentifyCommand::Connect);
        assert_eq!(msg.header.client_id, None);
    }

    #[test]
    fn identify_reconnect_for_known_client() {
        let session = Session {
            relay_token: Some("r1".into()),
            client_id: Some("c1".into()),
        };
        let value: Value =
            serde_json::from_str(&IdentifyMessage::for_session(&session).to_json().unwrap())
                .unwrap();
        assert_eq!(
            value,
            json!({"header": {"cmd": "reconnect", "client_id": "c1"}, "contents": null})
        );
    }

    #[test]
    fn parse_gyro_sample() {
        let msg =
            InboundMessage::parse(r#"{"contents": {"gyro": {"alpha": 10.5, "gamma": -20}}}"#)
                .unwrap();
        assert_eq!(msg.client_id, None);
        assert_eq!(
            msg.gyro,
            GyroPayload::Sample(OrientationSample {
                alpha: 10.5,
                gamma: -20.0
            })
        );
    }

    #[test]
    fn parse_client_id_only() {
        let msg = InboundMessage::parse(r#"{"header": {"client_id": "abc"}}"#).unwrap();
        assert_eq!(msg.client_id.as_deref(), Some("abc"));
        assert_eq!(msg.gyro, GyroPayload::Absent);
    }

    #[test]
    fn null_client_id_is_ignored() {
        let msg = InboundMessage::parse(r#"{"header": {"client_id": null}}"#).unwrap();
        assert_eq!(msg.client_id, None);
    }

    #[test]
    fn null_contents_is_absent() {
        let msg = InboundMessage::parse(r#"{"contents": null}"#).unwrap();
        assert_eq!(msg.gyro, GyroPayload::Absent);
    }

    #[test]
    fn contents_without_gyro_is_absent() {
        let msg = InboundMessage::parse(r#"{"contents": {"text": "hi"}}"#).unwrap();
        assert_eq!(msg.gyro, GyroPayload::Absent);
    }

    #[test]
    fn null_gyro_is_absent() {
        let msg = InboundMessage::parse(r#"{"contents": {"gyro": null}}"#).unwrap();
        assert_eq!(msg.gyro, GyroPayload::Absent);
    }

    #[test]
    fn gyro_without_gamma_is_absent() {
        let msg = InboundMessage::parse(r#"{"contents": {"gyro": {"alpha": 1}}}"#).unwrap();
        assert_eq!(msg.gyro, GyroPayload::Absent);
    }

    #[test]
    fn gyro_without_alpha_is_invalid() {
        let msg = InboundMessage::parse(r#"{"contents": {"gyro": {"gamma": 1}}}"#).unwrap();
        assert_matches!(msg.gyro, GyroPayload::Invalid(_));
    }

    #[test]
    fn string_gamma_is_invalid() {
        let msg = InboundMessage::parse(&json!({"contents": {"gyro": {"alpha": 1, "gamma": "x"}}}).to_string())
            .unwrap();
        assert_matches!(msg.gyro, GyroPayload::Invalid(reason) if reason.contains("gamma"));
    }

    #[test]
    fn client_id_survives_invalid_gyro() {
        let msg = InboundMessage::parse(
            r#"{"header": {"client_id": "abc"}, "contents": {"gyro": []}}"#,
        )
        .unwrap();
        assert_eq!(msg.client_id.as_deref(), Some("abc"));
        assert_matches!(msg.gyro, GyroPayload::Invalid(_));
    }

    #[test]
    fn non_json_is_error() {
        assert_matches!(InboundMessage::parse("not json"), Err(MessageError::Json(_)));
    }

    #[test]
    fn non_object_is_error() {
        assert_matches!(InboundMessage::parse("[1, 2]"), Err(MessageError::NotAnObject));
    }
}
