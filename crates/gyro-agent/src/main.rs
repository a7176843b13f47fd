//! # gyro-agent
//!
//! Gyro relay bridge binary. Loads settings, makes sure a relay token is
//! available, then forwards gyro telemetry from the relay to the servos
//! until the connection closes or Ctrl-C is pressed.

#![deny(unsafe_code)]

mod startup;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use gyro_auth::RelayTokenClient;
use gyro_client::ConnectionManager;
use gyro_settings::load_settings_from_path;
use tracing::{error, info, warn};

/// Gyro relay bridge.
#[derive(Parser, Debug)]
#[command(name = "gyro-agent", about = "Drive two servos from relayed gyro telemetry")]
struct Cli {
    /// Path to the settings file (also holds the persisted session).
    #[arg(long, env = "GYRO_SETTINGS", default_value = "settings.json")]
    settings: PathBuf,

    /// Log servo commands instead of driving GPIO.
    #[arg(long)]
    dry_run: bool,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, env = "GYRO_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Timeout for the relay token request, in seconds.
    #[arg(long, default_value = "30")]
    http_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    gyro_core::logging::init_subscriber(&cli.log_level);

    let result = run(cli).await;
    if let Err(e) = &result {
        error!(error = format!("{e:#}"), "bridge stopped");
    }
    result
}

async fn run(cli: Cli) -> Result<()> {
    let loaded = load_settings_from_path(&cli.settings)
        .with_context(|| format!("Failed to load settings: {}", cli.settings.display()))?;
    let config = loaded.config;
    let mut session = loaded.session;
    let mut store = loaded.store;
    info!(
        settings = %cli.settings.display(),
        resume = session.can_resume(),
        "settings loaded"
    );

    let relay_client = RelayTokenClient::new(
        config.endpoints.relay_token.clone(),
        Duration::from_secs(cli.http_timeout_secs),
    )
    .context("Failed to build HTTP client")?;
    let relay_token =
        startup::ensure_relay_token(&mut session, &mut store, &relay_client, &config.token).await?;

    let url = config.endpoints.websocket_url(&relay_token)?;
    let servo = startup::build_servo(&config.servo, cli.dry_run)?;

    let mut manager =
        ConnectionManager::new(session, store, servo).with_pulse_range(config.servo.pulse_range());
    gyro_client::run(&url, &mut manager, shutdown_signal()).await?;

    info!(state = %manager.state(), "relay connection finished");
    Ok(())
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Ctrl-C received, closing relay connection"),
        Err(e) => {
            warn!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}
