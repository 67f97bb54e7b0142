//! Flat key-value storage for persisted progress.
//!
//! The engine only ever needs `get` / `set` / `remove` on string keys, the
//! same contract a browser's local storage offers. Storage is treated as
//! instantaneous and infallible: backends log write failures instead of
//! returning them.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Storage keys for the four persisted records.
pub mod keys {
    pub const LEADERBOARD: &str = "heartquest-leaderboard";
    pub const LEVEL_PROGRESS: &str = "heartquest-progress";
    pub const HEARTS: &str = "heartquest-hearts";
    pub const XP: &str = "heartquest-xp";

    pub const ALL: [&str; 4] = [LEADERBOARD, LEVEL_PROGRESS, HEARTS, XP];
}

/// Durable string-keyed storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);

    /// Remove several keys as one step. Backends that persist on every
    /// write override this so no partially-removed state is ever written.
    fn remove_all(&mut self, keys: &[&str]) {
        for key in keys {
            self.remove(key);
        }
    }
}

/// In-memory store. Contents are lost when dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Store backed by a single JSON object file.
///
/// The whole file is read once at open and rewritten after every mutation.
/// A missing file starts empty; an unreadable or malformed one is treated
/// the same way and logged.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed store file {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                log::warn!("Could not read store file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) {
        let result = serde_json::to_string_pretty(&self.entries)
            .map_err(std::io::Error::from)
            .and_then(|json| std::fs::write(&self.path, json));
        if let Err(e) = result {
            log::warn!("Could not write store file {}: {}", self.path.display(), e);
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
        self.flush();
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.flush();
        }
    }

    fn remove_all(&mut self, keys: &[&str]) {
        let before = self.entries.len();
        for key in keys {
            self.entries.remove(*key);
        }
        if self.entries.len() != before {
            self.flush();
        }
    }
}
