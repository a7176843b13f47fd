//! Settings loading.
//!
//! Loading flow:
//! 1. Read and parse the settings file (missing or corrupt file is an error)
//! 2. Check every key in [`REQUIRED_KEYS`] is present
//! 3. Deserialize the static [`Config`] and validate it
//! 4. Extract the [`Session`] and hand the document to a [`FileSessionStore`]
//!
//! Nothing is default-filled except the optional `servo` section.

use std::path::Path;

use gyro_core::Session;
use tracing::debug;

use crate::config::{Config, REQUIRED_KEYS};
use crate::errors::Result;
use crate::session::{FileSessionStore, lookup, read_document, session_from_document};

/// Everything produced by loading the settings file.
#[derive(Debug)]
pub struct LoadedSettings {
    /// Read-only configuration.
    pub config: Config,
    /// Session state at startup.
    pub session: Session,
    /// Store that writes session changes back to the same file.
    pub store: FileSessionStore,
}

/// Load and validate the settings file at `path`.
pub fn load_settings_from_path(path: &Path) -> Result<LoadedSettings> {
    debug!(?path, "loading settings");
    let document = read_document(path)?;

    for key_path in REQUIRED_KEYS {
        let _ = lookup(&document, key_path)?;
    }

    let config: Config = serde_json::from_value(document.clone())?;
    config.validate()?;
    let session = session_from_document(&document)?;

    debug!(
        has_relay_token = session.relay_token.is_some(),
        has_client_id = session.client_id.is_some(),
        "settings loaded"
    );

    Ok(LoadedSettings {
        config,
        session,
        store: FileSessionStore::from_document(path.to_path_buf(), document),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SettingsError;
    use crate::session::SessionPersistence;
    use assert_matches::assert_matches;
    use serde_json::{Value, json};

    fn full_settings() -> Value {
        json!({
            "token": "secret",
            "endpoints": {
                "relay_token": "http://localhost:8080/api/v1/relays",
                "relay_websocket": "ws://localhost:8080/api/v1/relays/%s/ws"
            },
            "relay": {"relay_token": "r1", "client_id": null}
        })
    }

    fn write(dir: &Path, value: &Value) -> std::path::PathBuf {
        let path = dir.join("settings.json");
        std::fs::write(&path, value.to_string()).unwrap();
        path
    }

    fn remove(value: &mut Value, path: &[&str]) {
        let (last, parents) = path.split_last().unwrap();
        let mut current = value;
        for key in parents {
            current = current.get_mut(*key).unwrap();
        }
        let _ = current.as_object_mut().unwrap().remove(*last);
    }

    #[test]
    fn loads_full_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), &full_settings());

        let loaded = load_settings_from_path(&path).unwrap();
        assert_eq!(loaded.config.token, "secret");
        assert_eq!(
            loaded.config.endpoints.websocket_url("r1").unwrap(),
            "ws://localhost:8080/api/v1/relays/r1/ws"
        );
        assert_eq!(loaded.config.servo.alpha_pin, 23);
        assert_eq!(loaded.session.relay_token.as_deref(), Some("r1"));
        assert_eq!(loaded.session.client_id, None);
        assert_eq!(loaded.store.path(), path.as_path());
    }

    #[test]
    fn every_required_key_is_enforced() {
        for key_path in REQUIRED_KEYS {
            let dir = tempfile::tempdir().unwrap();
            let mut settings = full_settings();
            remove(&mut settings, key_path);
            let path = write(dir.path(), &settings);

            let err = load_settings_from_path(&path).unwrap_err();
            assert_matches!(
                err,
                SettingsError::MissingKey(ref key) if *key == key_path.join("."),
                "removing {key_path:?}"
            );
        }
    }

    #[test]
    fn null_relay_values_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = full_settings();
        settings["relay"]["relay_token"] = Value::Null;
        let path = write(dir.path(), &settings);

        let loaded = load_settings_from_path(&path).unwrap();
        assert_eq!(loaded.session, Session::default());
    }

    #[test]
    fn missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert_matches!(
            load_settings_from_path(&dir.path().join("settings.json")),
            Err(SettingsError::Io(_))
        );
    }

    #[test]
    fn servo_section_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = full_settings();
        settings["servo"] = json!({"alpha_pin": 12, "gamma_pin": 13});
        let path = write(dir.path(), &settings);

        let loaded = load_settings_from_path(&path).unwrap();
        assert_eq!(loaded.config.servo.alpha_pin, 12);
        assert_eq!(loaded.config.servo.gamma_pin, 13);
    }

    #[test]
    fn invalid_servo_range_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = full_settings();
        settings["servo"] = json!({"min_pulse_us": 3000});
        let path = write(dir.path(), &settings);

        assert_matches!(
            load_settings_from_path(&path),
            Err(SettingsError::InvalidValue(_))
        );
    }

    #[test]
    fn store_from_loader_persists_to_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), &full_settings());

        let mut loaded = load_settings_from_path(&path).unwrap();
        let _ = loaded.session.assign_client_id("c9");
        loaded.store.save(&loaded.session).unwrap();

        let reloaded = load_settings_from_path(&path).unwrap();
        assert_eq!(reloaded.session.client_id.as_deref(), Some("c9"));
        assert_eq!(reloaded.session.relay_token.as_deref(), Some("r1"));
        assert_eq!(reloaded.config, loaded.config);
    }
}
