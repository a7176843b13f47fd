//! # gyro-auth
//!
//! Exchanges the long-lived auth token from the settings file for a
//! short-lived relay token.
//!
//! The exchange is one `POST` with a `token` form field. The service answers
//! `{"relay": "<token>"}` on success or `{"errors": [...]}` on failure.
//! Nothing here retries; a failed exchange is reported to the caller, which
//! must keep whatever relay token it already had.

#![deny(unsafe_code)]

pub mod errors;

pub use errors::RelayAuthError;

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

/// Relay-token endpoint used when none is configured.
pub const DEFAULT_RELAY_TOKEN_ENDPOINT: &str = "http://localhost:8080/api/v1/relays";
/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the relay-token endpoint.
#[derive(Clone, Debug)]
pub struct RelayTokenClient {
    http: reqwest::Client,
    endpoint: String,
}

impl RelayTokenClient {
    /// Build a client for `endpoint` with the given request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, RelayAuthError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayAuthError::Client(e.to_string()))?;
        Ok(Self::with_client(http, endpoint))
    }

    /// Wrap an existing `reqwest` client.
    pub fn with_client(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    /// Endpoint this client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Exchange `auth_token` for a relay token.
    pub async fn acquire(&self, auth_token: &str) -> Result<String, RelayAuthError> {
        acquire_relay_token(&self.http, &self.endpoint, auth_token).await
    }
}

/// Exchange `auth_token` for a relay token at `endpoint`.
pub async fn acquire_relay_token(
    http: &reqwest::Client,
    endpoint: &str,
    auth_token: &str,
) -> Result<String, RelayAuthError> {
    debug!(endpoint, "requesting relay token");
    let resp = http
        .post(endpoint)
        .form(&[("token", auth_token)])
        .send()
        .await
        .map_err(|e| RelayAuthError::Network(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "relay token request failed");
        return Err(RelayAuthError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let body = resp
        .text()
        .await
        .map_err(|e| RelayAuthError::Network(e.to_string()))?;
    parse_relay_response(&body)
}

/// Interpret a success-status response body.
pub fn parse_relay_response(body: &str) -> Result<String, RelayAuthError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| RelayAuthError::Parse(e.to_string()))?;

    if let Some(errors) = value.get("errors") {
        return Err(RelayAuthError::Rejected(describe_errors(errors)));
    }

    value
        .get("relay")
        .and_then(Value::as_str)
        .filter(|relay| !relay.is_empty())
        .map(str::to_string)
        .ok_or(RelayAuthError::MissingRelay)
}

fn describe_errors(errors: &Value) -> String {
    match errors {
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map_or_else(|| item.to_string(), str::to_string))
            .collect::<Vec<_>>()
            .join("; "),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
