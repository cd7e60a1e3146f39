use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::Result;

/// Keys the console keeps between runs. Values are strings, JSON-encoded
/// where the value is structured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// Logged-in user record.
    User,
    /// Cached `/api/status` payload.
    Status,
    IdSort,
    PageSize,
    /// Last notice shown on the home page.
    Notice,
    HomePageContent,
    /// Affiliate code picked up from an invite link.
    Aff,
    MjNotifyEnabled,
    /// Gateway session cookie (`session=...`).
    Session,
}

impl StoreKey {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::User => "user",
            StoreKey::Status => "status",
            StoreKey::IdSort => "id-sort",
            StoreKey::PageSize => "page-size",
            StoreKey::Notice => "notice",
            StoreKey::HomePageContent => "home_page_content",
            StoreKey::Aff => "aff",
            StoreKey::MjNotifyEnabled => "mj_notify_enabled",
            StoreKey::Session => "session",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// String key/value map persisted as one JSON file.
#[derive(Debug, Default)]
pub struct LocalStore {
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
}

impl LocalStore {
    /// Loads the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "corrupt store file, starting empty");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        debug!(path = %path.display(), entries = entries.len(), "store loaded");
        Self {
            path: Some(path),
            entries,
        }
    }

    /// Non-persistent store; writes only touch memory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn get(&self, key: StoreKey) -> Option<&str> {
        self.entries.get(key.as_str()).map(String::as_str)
    }

    pub fn set(&mut self, key: StoreKey, value: impl Into<String>) -> Result<()> {
        self.entries.insert(key.as_str().to_string(), value.into());
        self.flush()
    }

    pub fn remove(&mut self, key: StoreKey) -> Result<()> {
        if self.entries.remove(key.as_str()).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: StoreKey) -> Option<T> {
        self.get(key).and_then(|s| serde_json::from_str(s).ok())
    }

    pub fn set_json<T: Serialize>(&mut self, key: StoreKey, value: &T) -> Result<()> {
        let encoded = serde_json::to_string(value)?;
        self.set(key, encoded)
    }

    fn flush(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;
        // same directory keeps the rename atomic
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&serde_json::to_vec_pretty(&self.entries)?)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Cloneable handle to one [`LocalStore`], shared by every page.
#[derive(Debug, Clone, Default)]
pub struct SharedStore(Arc<Mutex<LocalStore>>);

impl SharedStore {
    pub fn new(store: LocalStore) -> Self {
        Self(Arc::new(Mutex::new(store)))
    }

    pub fn in_memory() -> Self {
        Self::new(LocalStore::in_memory())
    }

    fn lock(&self) -> MutexGuard<'_, LocalStore> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, key: StoreKey) -> Option<String> {
        self.lock().get(key).map(str::to_string)
    }

    pub fn set(&self, key: StoreKey, value: impl Into<String>) -> Result<()> {
        self.lock().set(key, value)
    }

    pub fn remove(&self, key: StoreKey) -> Result<()> {
        self.lock().remove(key)
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: StoreKey) -> Option<T> {
        self.lock().get_json(key)
    }

    pub fn set_json<T: Serialize>(&self, key: StoreKey, value: &T) -> Result<()> {
        self.lock().set_json(key, value)
    }

    /// `"true"` is true; anything else, including absence, is false.
    pub fn get_bool(&self, key: StoreKey) -> bool {
        self.get(key).as_deref() == Some("true")
    }

    /// Positive integer value, if one is stored.
    pub fn get_usize(&self, key: StoreKey) -> Option<usize> {
        self.get(key)
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
    }
}
