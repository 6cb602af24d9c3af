//! Preference persistence
//!
//! `PreferenceStore` is the load/save contract the controller talks to.
//! Failures never leave this module: `load` falls back to defaults and
//! `save` logs and carries on.

use crate::config::PreferenceSnapshot;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

/// Fixed storage key of the preference record
pub const PREFS_STORAGE_KEY: &str = "a11y:prefs";
/// Storage key of the UI language ("en" or "es")
pub const LANG_STORAGE_KEY: &str = "lang";

/// Storage backend error
#[derive(Debug)]
pub enum StorageError {
    /// File I/O failure
    Io(std::io::Error),
    /// Backend not reachable (private browsing, quota exceeded, no HOME...)
    Unavailable(String),
    /// Record could not be encoded
    Serialization(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {}", e),
            StorageError::Unavailable(msg) => write!(f, "storage unavailable: {}", msg),
            StorageError::Serialization(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// String key-value backend (localStorage semantics)
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;
}

/// Durable preference record
pub trait PreferenceStore {
    /// Stored snapshot, or the defaults when absent or unreadable
    fn load(&self) -> PreferenceSnapshot;
    /// Best-effort full write
    fn save(&self, snapshot: &PreferenceSnapshot);
}

/// JSON record under a single key
pub struct JsonPreferenceStore<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStorage> JsonPreferenceStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, PREFS_STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Save with the error reported instead of swallowed
    pub fn try_save(&self, snapshot: &PreferenceSnapshot) -> StorageResult<()> {
        let json = snapshot.to_json()?;
        self.storage.set_item(&self.key, &json)
    }
}

impl<S: KeyValueStorage> PreferenceStore for JsonPreferenceStore<S> {
    fn load(&self) -> PreferenceSnapshot {
        match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => PreferenceSnapshot::from_json(&raw),
            Ok(None) => PreferenceSnapshot::default(),
            Err(e) => {
                log::warn!("preference storage unavailable, using defaults: {}", e);
                PreferenceSnapshot::default()
            }
        }
    }

    fn save(&self, snapshot: &PreferenceSnapshot) {
        if let Err(e) = self.try_save(snapshot) {
            log::warn!("failed to persist preferences: {}", e);
        }
    }
}

/// In-memory backend. Clones share the same map.
#[derive(Clone, Default, Debug)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(self, key: &str, value: &str) -> Self {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.raw(key))
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preference directory: $XDG_CONFIG_HOME/a11y-assist or ~/.config/a11y-assist
pub fn config_dir() -> PathBuf {
    let from_env = |var: &str| {
        std::env::var(var)
            .ok()
            .map(PathBuf::from)
            .filter(|p| p.is_absolute() && p.is_dir())
    };
    if let Some(xdg) = from_env("XDG_CONFIG_HOME") {
        return xdg.join("a11y-assist");
    }
    // no usable HOME: /var/tmp is writable and survives reboots
    from_env("HOME")
        .map(|home| home.join(".config"))
        .unwrap_or_else(|| PathBuf::from("/var/tmp"))
        .join("a11y-assist")
}

/// One JSON file per key inside a directory
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage rooted at `config_dir()`
    pub fn user_default() -> Self {
        Self::new(config_dir())
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// File backing `key`; characters outside [A-Za-z0-9_-] become '_'
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        // write-then-rename so readers never see a half-written record
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PreferenceUpdate, Theme};

    struct BrokenStorage;

    impl KeyValueStorage for BrokenStorage {
        fn get_item(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::Unavailable("disabled".into()))
        }

        fn set_item(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Unavailable("quota exceeded".into()))
        }
    }

    #[test]
    fn test_load_absent_record() {
        let store = JsonPreferenceStore::new(MemoryStorage::new());
        assert_eq!(store.load(), PreferenceSnapshot::default());
    }

    #[test]
    fn test_save_then_load() {
        let storage = MemoryStorage::new();
        let store = JsonPreferenceStore::new(storage.clone());
        let prefs = PreferenceSnapshot::default()
            .merged(&PreferenceUpdate::new().theme(Theme::Dark).font_size(1.4));
        store.save(&prefs);

        assert!(storage.raw(PREFS_STORAGE_KEY).unwrap().contains("\"dark\""));
        assert_eq!(store.load(), prefs);
    }

    #[test]
    fn test_unavailable_storage_is_silent() {
        let store = JsonPreferenceStore::new(BrokenStorage);
        assert_eq!(store.load(), PreferenceSnapshot::default());
        store.save(&PreferenceSnapshot::default());
        assert!(store.try_save(&PreferenceSnapshot::default()).is_err());
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));
        assert_eq!(storage.get_item(PREFS_STORAGE_KEY).unwrap(), None);

        storage.set_item(PREFS_STORAGE_KEY, "{}").unwrap();
        assert_eq!(
            storage.get_item(PREFS_STORAGE_KEY).unwrap().as_deref(),
            Some("{}")
        );
        assert!(storage
            .path_for(PREFS_STORAGE_KEY)
            .ends_with("a11y_prefs.json"));
        assert!(!storage
            .path_for(PREFS_STORAGE_KEY)
            .with_extension("json.tmp")
            .exists());
    }
}
