//! Persisted guard state: the key-value store contract and two implementations.
//!
//! The guard keeps exactly two values, under [`LAST_CONTENT_FINGERPRINT`] and
//! [`LANGUAGE_PREFERENCE`]. Stores are synchronous and must give
//! read-after-write consistency; both implementations here serialize access
//! behind a `Mutex`.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

/// Key holding the fingerprint recorded after the last completed pass.
pub const LAST_CONTENT_FINGERPRINT: &str = "lastContentFingerprint";

/// Key holding the user's last selected display language.
pub const LANGUAGE_PREFERENCE: &str = "languagePreference";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("store file {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Durable, synchronous string key-value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store, for tests and hosts without durable storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing values (e.g. state from a previous session).
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave a HashMap half-written.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a single JSON object file.
///
/// Every `set` rewrites the whole file through a temporary sibling and a
/// rename, so a crash mid-write leaves the previous state intact. A missing
/// file reads as an empty store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_all(&self) -> Result<Map<String, Value>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(StoreError::Corrupt {
                path: self.path.clone(),
                reason: format!("expected a JSON object, found {}", json_kind(&other)),
            }),
            Err(e) => Err(StoreError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            }),
        }
    }

    fn write_all(&self, map: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let json = serde_json::to_string_pretty(map).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        let tmp = self.temp_path();
        let written = fs::write(&tmp, json).and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(self.io_error(e));
        }
        Ok(())
    }

    /// Sibling of the state file, unique per process and per write, so
    /// concurrent writers never share a temporary file.
    fn temp_path(&self) -> PathBuf {
        static WRITES: AtomicU64 = AtomicU64::new(0);

        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "state".to_string());
        let seq = WRITES.fetch_add(1, Ordering::Relaxed);
        self.path
            .with_file_name(format!(".{}.{}.{}.tmp", name, std::process::id(), seq))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let map = self.read_all()?;
        Ok(map.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut map = self.read_all()?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.write_all(&map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ==================== MemoryStore Tests ====================

    #[test]
    fn test_memory_store_missing_key() {
        let store = MemoryStore::new();
        assert_eq!(store.get(LANGUAGE_PREFERENCE).unwrap(), None);
    }

    #[test]
    fn test_memory_store_set_then_get() {
        let store = MemoryStore::new();
        store.set(LANGUAGE_PREFERENCE, "de").unwrap();
        assert_eq!(store.get(LANGUAGE_PREFERENCE).unwrap().as_deref(), Some("de"));
    }

    #[test]
    fn test_memory_store_overwrite() {
        let store = MemoryStore::with_entries([(LAST_CONTENT_FINGERPRINT, "1")]);
        store.set(LAST_CONTENT_FINGERPRINT, "2").unwrap();
        assert_eq!(store.get(LAST_CONTENT_FINGERPRINT).unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_memory_store_keys_are_independent() {
        let store = MemoryStore::new();
        store.set(LANGUAGE_PREFERENCE, "fr").unwrap();
        assert_eq!(store.get(LAST_CONTENT_FINGERPRINT).unwrap(), None);
    }

    // ==================== FileStore Tests ====================

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("state.json"));
        assert_eq!(store.get(LANGUAGE_PREFERENCE).unwrap(), None);
    }

    #[test]
    fn test_file_store_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("state.json");
        let store = FileStore::new(&path);
        store.set(LANGUAGE_PREFERENCE, "en").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        FileStore::new(&path).set(LAST_CONTENT_FINGERPRINT, "-609428141").unwrap();
        FileStore::new(&path).set(LANGUAGE_PREFERENCE, "zh-TW").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get(LAST_CONTENT_FINGERPRINT).unwrap().as_deref(),
            Some("-609428141")
        );
        assert_eq!(reopened.get(LANGUAGE_PREFERENCE).unwrap().as_deref(), Some("zh-TW"));
    }

    #[test]
    fn test_file_store_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        FileStore::new(&path).set(LANGUAGE_PREFERENCE, "en").unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("state.json")]);
    }

    #[test]
    fn test_file_store_temp_paths_are_unique_siblings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let first = FileStore::new(&path).temp_path();
        let second = FileStore::new(&path).temp_path();

        assert_ne!(first, second);
        assert_eq!(first.parent(), path.parent());
        assert_ne!(first, path);
    }

    #[test]
    fn test_file_store_concurrent_writers_on_one_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        let writers: Vec<_> = (0..4)
            .map(|i| {
                let store = FileStore::new(&path);
                std::thread::spawn(move || {
                    for n in 0..25 {
                        store
                            .set(LAST_CONTENT_FINGERPRINT, &format!("{}", i * 100 + n))
                            .expect("every write should land");
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let last = FileStore::new(&path).get(LAST_CONTENT_FINGERPRINT).unwrap();
        assert!(last.is_some());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_file_store_corrupt_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = FileStore::new(&path).get(LANGUAGE_PREFERENCE).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn test_file_store_non_object_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let err = FileStore::new(&path).get(LANGUAGE_PREFERENCE).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_file_store_non_string_value_is_stringified() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"lastContentFingerprint": 2081}"#).unwrap();

        let store = FileStore::new(&path);
        assert_eq!(store.get(LAST_CONTENT_FINGERPRINT).unwrap().as_deref(), Some("2081"));
    }

    #[test]
    fn test_file_store_empty_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "").unwrap();
        assert_eq!(FileStore::new(&path).get(LANGUAGE_PREFERENCE).unwrap(), None);
    }
}
