//! Persistent key-value storage.
//!
//! Values are opaque strings; callers serialize lists and flags themselves.
//! Everything is loaded once up front and rewritten wholesale on each `set`.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::{collections::BTreeMap, fs, path::PathBuf};

pub const RECENT_SEARCHES_KEY: &str = "recentSearches";
pub const FAVORITES_KEY: &str = "favorites";
pub const DARK_MODE_KEY: &str = "darkMode";
pub const TEMPERATURE_UNIT_KEY: &str = "temperatureUnit";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-process store; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries.lock().insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a single JSON object file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("Ignoring corrupt storage file {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!("Failed to read storage file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create storage directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(entries).context("Failed to serialize storage")?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write storage file: {}", self.path.display()))?;

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new().with_entry("a", "1");
        assert_eq!(store.get("a").as_deref(), Some("1"));
        assert_eq!(store.get("b"), None);

        store.set("b", "2").unwrap();
        assert_eq!(store.get("b").as_deref(), Some("2"));
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let store = FileStore::open(&path);
        assert_eq!(store.get(DARK_MODE_KEY), None);
        store.set(DARK_MODE_KEY, "true").unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get(DARK_MODE_KEY).as_deref(), Some("true"));
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{ not json").unwrap();

        let store = FileStore::open(&path);
        assert_eq!(store.get(FAVORITES_KEY), None);

        store.set(FAVORITES_KEY, "[]").unwrap();
        assert_eq!(FileStore::open(&path).get(FAVORITES_KEY).as_deref(), Some("[]"));
    }
}
