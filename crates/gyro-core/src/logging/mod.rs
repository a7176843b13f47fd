//! Logging setup.
//!
//! Everything logs through `tracing` macros with structured fields. The
//! binary calls [`init_subscriber`] once; tests use [`capture_logs`].

pub mod test_utils;

pub use test_utils::{LogCapture, LogRecord, capture_logs};

use tracing_subscriber::EnvFilter;

/// Install the global stderr subscriber.
///
/// `RUST_LOG` wins over `level` when set. Later calls do nothing.
pub fn init_subscriber(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init_subscriber("warn");
        init_subscriber("gyro_client=debug");
    }
}
