//! Startup steps that run before the relay connection opens.

use anyhow::{Context, Result};
use gyro_auth::RelayTokenClient;
use gyro_core::Session;
use gyro_servo::{RecordingServoDriver, ServoDriver};
use gyro_settings::{ServoSettings, SessionPersistence};
use tracing::{error, info};

/// Return the session's relay token, acquiring and persisting one if absent.
///
/// On failure the session and the store are left untouched.
pub(crate) async fn ensure_relay_token<P: SessionPersistence>(
    session: &mut Session,
    store: &mut P,
    client: &RelayTokenClient,
    auth_token: &str,
) -> Result<String> {
    if let Some(relay_token) = &session.relay_token {
        info!("reusing stored relay token");
        return Ok(relay_token.clone());
    }

    let relay_token = match client.acquire(auth_token).await {
        Ok(token) => token,
        Err(e) => {
            error!(kind = e.error_kind(), error = %e, endpoint = client.endpoint(), "relay token acquisition failed");
            return Err(e).context("failed to acquire relay token");
        }
    };
    info!("acquired new relay token");

    session.relay_token = Some(relay_token.clone());
    store
        .save(session)
        .context("failed to persist relay token")?;
    Ok(relay_token)
}

/// Build the servo backend: recorder for dry runs, GPIO otherwise.
pub(crate) fn build_servo(settings: &ServoSettings, dry_run: bool) -> Result<Box<dyn ServoDriver>> {
    if dry_run {
        info!("dry run: servo commands are logged, not sent to GPIO");
        return Ok(Box::new(RecordingServoDriver::new()));
    }
    open_gpio(settings)
}

#[cfg(target_os = "linux")]
fn open_gpio(settings: &ServoSettings) -> Result<Box<dyn ServoDriver>> {
    let driver = gyro_servo::GpioServoDriver::open(settings.alpha_pin, settings.gamma_pin)
        .context("failed to open GPIO servo output")?;
    info!(
        alpha_pin = settings.alpha_pin,
        gamma_pin = settings.gamma_pin,
        "GPIO servo output ready"
    );
    Ok(Box::new(driver))
}

#[cfg(not(target_os = "linux"))]
fn open_gpio(_settings: &ServoSettings) -> Result<Box<dyn ServoDriver>> {
    anyhow::bail!("GPIO servo output is only available on Linux; use --dry-run")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
