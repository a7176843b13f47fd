//! Session persistence.
//!
//! [`FileSessionStore`] owns the settings document loaded at startup and
//! rewrites it atomically (temp file in the same directory, fsync, rename)
//! whenever the session changes. Only the `relay` object is patched; every
//! other key is written back exactly as it was loaded.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gyro_core::Session;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::config::REQUIRED_KEYS;
use crate::errors::{Result, SettingsError};

/// Write side of the session store.
///
/// `save` must be durable when it returns.
pub trait SessionPersistence {
    /// Persist the full session.
    fn save(&mut self, session: &Session) -> Result<()>;
}

impl<P: SessionPersistence + ?Sized> SessionPersistence for Box<P> {
    fn save(&mut self, session: &Session) -> Result<()> {
        (**self).save(session)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File-backed store
// ─────────────────────────────────────────────────────────────────────────────

/// Session store backed by the settings file.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    document: Value,
}

impl FileSessionStore {
    /// Open the store at `path`, reading the current document.
    ///
    /// Fails if the file is missing, is not JSON, or lacks the `relay` keys.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let document = read_document(&path)?;
        let _ = session_from_document(&document)?;
        Ok(Self { path, document })
    }

    pub(crate) fn from_document(path: PathBuf, document: Value) -> Self {
        Self { path, document }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the session currently on disk.
    pub fn load(&self) -> Result<Session> {
        session_from_document(&read_document(&self.path)?)
    }

    /// Session as of the last successful save (or open).
    pub fn last_saved(&self) -> Result<Session> {
        session_from_document(&self.document)
    }
}

impl SessionPersistence for FileSessionStore {
    fn save(&mut self, session: &Session) -> Result<()> {
        let mut document = self.document.clone();
        let relay = document
            .get_mut("relay")
            .and_then(Value::as_object_mut)
            .ok_or_else(|| SettingsError::MissingKey("relay".into()))?;
        let _ = relay.insert("relay_token".into(), serde_json::to_value(&session.relay_token)?);
        let _ = relay.insert("client_id".into(), serde_json::to_value(&session.client_id)?);

        let json = serde_json::to_string_pretty(&document)?;
        write_atomic(&self.path, json.as_bytes())?;
        self.document = document;
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }
}

/// Extract the session from a settings document.
pub fn session_from_document(document: &Value) -> Result<Session> {
    for path in REQUIRED_KEYS.iter().filter(|p| p[0] == "relay") {
        let _ = lookup(document, path)?;
    }
    Ok(serde_json::from_value(document["relay"].clone())?)
}

/// Resolve a key path, reporting the first missing segment.
pub(crate) fn lookup<'a>(document: &'a Value, path: &[&str]) -> Result<&'a Value> {
    let mut current = document;
    for (depth, key) in path.iter().enumerate() {
        current = current
            .get(key)
            .ok_or_else(|| SettingsError::MissingKey(path[..=depth].join(".")))?;
    }
    Ok(current)
}

pub(crate) fn read_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Replace `path` with `contents` so that readers see either the old or the
/// new file, never a partial one.
///
/// On Unix the directory is synced after the rename so the new entry
/// survives a power loss.
pub fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    let _ = tmp.persist(path).map_err(|e| e.error)?;
    #[cfg(unix)]
    std::fs::File::open(dir)?.sync_all()?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory store
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory session store recording every save.
///
/// Clones share the same history, so a test can keep one handle while the
/// connection manager owns another.
#[derive(Clone, Debug, Default)]
pub struct MemorySessionStore {
    saves: Arc<Mutex<Vec<Session>>>,
    fail: bool,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose saves always fail.
    pub fn failing() -> Self {
        Self {
            saves: Arc::default(),
            fail: true,
        }
    }

    /// Every session saved so far, oldest first.
    pub fn saves(&self) -> Vec<Session> {
        self.saves.lock().clone()
    }

    /// The most recently saved session.
    pub fn last(&self) -> Option<Session> {
        self.saves.lock().last().cloned()
    }
}

impl SessionPersistence for MemorySessionStore {
    fn save(&mut self, session: &Session) -> Result<()> {
        if self.fail {
            return Err(SettingsError::Io(std::io::Error::other("store unavailable")));
        }
        self.saves.lock().push(session.clone());
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
