use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use serde_json::Value;
use crate::domain::SubscriberRecord;

/// Key the subscriber record is stored under.
pub const SESSION_KEY: &str = "subscribeUser";

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("failed to access session storage")]
    Io(#[from] std::io::Error),
    #[error("session storage holds malformed data")]
    Serialization(#[from] serde_json::Error),
}

/// Durable storage for the single current-subscriber record.
pub trait SessionStore {
    fn load(&self) -> Result<Option<SubscriberRecord>, SessionError>;
    fn save(&mut self, record: &SubscriberRecord) -> Result<(), SessionError>;
    fn clear(&mut self) -> Result<(), SessionError>;
}

/// Key-value file shaped like browser local storage: a JSON object whose
/// entries survive restarts. Only [`SESSION_KEY`] is read or written.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, Value>, SessionError> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, Value>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        // Whole-file replace so a crash never leaves a half-written record.
        let staging = self.path.with_extension("tmp");
        std::fs::write(&staging, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    #[tracing::instrument(name = "Loading session", skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Option<SubscriberRecord>, SessionError> {
        match self.read_entries()?.remove(SESSION_KEY) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    #[tracing::instrument(name = "Saving session", skip(self, record), fields(path = %self.path.display()))]
    fn save(&mut self, record: &SubscriberRecord) -> Result<(), SessionError> {
        let mut entries = self.read_entries().unwrap_or_else(|e| {
            tracing::warn!("Discarding unreadable session storage: {:?}", e);
            BTreeMap::new()
        });
        entries.insert(SESSION_KEY.to_string(), serde_json::to_value(record)?);
        self.write_entries(&entries)
    }

    #[tracing::instrument(name = "Clearing session", skip(self), fields(path = %self.path.display()))]
    fn clear(&mut self) -> Result<(), SessionError> {
        match self.read_entries() {
            Ok(mut entries) => {
                if entries.remove(SESSION_KEY).is_some() {
                    self.write_entries(&entries)?;
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Resetting unreadable session storage: {:?}", e);
                self.write_entries(&BTreeMap::new())
            }
        }
    }
}

/// Process-local store. Clones share the same entries, so a test can keep a
/// handle and inspect what the widget persisted.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw JSON stored under `key`.
    pub fn get_item(&self, key: &str) -> Option<Value> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key).and_then(|raw| serde_json::from_str(raw).ok())
    }

    pub fn set_item(&self, key: &str, raw: impl Into<String>) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), raw.into());
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self) -> Result<Option<SubscriberRecord>, SessionError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(SESSION_KEY) {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, record: &SubscriberRecord) -> Result<(), SessionError> {
        let raw = serde_json::to_string(record)?;
        self.set_item(SESSION_KEY, raw);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SessionError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(SESSION_KEY);
        Ok(())
    }
}
