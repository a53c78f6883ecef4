//! Local persistence for the favorites and watchlist ID lists.
//!
//! Each list is a JSON string array stored under a fixed key. The store calls
//! into this module after a state transition; nothing here knows about actions
//! or reducers.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

// ============================================================================
// Keys and Errors
// ============================================================================

/// The two persisted lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKey {
    Favorites,
    Watchlist,
}

impl ListKey {
    pub const ALL: [ListKey; 2] = [ListKey::Favorites, ListKey::Watchlist];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Favorites => "favorites",
            Self::Watchlist => "watchlist",
        }
    }
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Stored {key} list is not a JSON string array: {source}")]
    Malformed {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode list: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("List storage lock poisoned")]
    Poisoned,
}

impl PersistenceError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

// ============================================================================
// Persistence Boundary
// ============================================================================

/// Durable storage for ID lists.
///
/// Implementations must make `save` all-or-nothing: a reader never observes a
/// partially written list.
pub trait ListPersistence: Send + Sync {
    /// Read a list. A missing entry is an empty list.
    fn load(&self, key: ListKey) -> Result<Vec<String>, PersistenceError>;

    fn save(&self, key: ListKey, ids: &[String]) -> Result<(), PersistenceError>;

    /// Delete the entry. Removing a missing entry is not an error.
    fn remove(&self, key: ListKey) -> Result<(), PersistenceError>;

    /// Move an unreadable entry out of the way so the next save starts clean.
    fn quarantine(&self, key: ListKey) -> Result<(), PersistenceError> {
        self.remove(key)
    }
}

/// Decode a stored list, collapsing duplicate IDs (first occurrence wins).
pub fn decode_list(key: ListKey, raw: &str) -> Result<Vec<String>, PersistenceError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<String> = serde_json::from_str(raw).map_err(|source| PersistenceError::Malformed {
        key: key.as_str(),
        source,
    })?;
    let before = ids.len();
    let ids = dedupe(ids);
    if ids.len() != before {
        tracing::warn!(
            key = key.as_str(),
            removed = before - ids.len(),
            "Dropped duplicate IDs from stored list"
        );
    }
    Ok(ids)
}

fn dedupe(ids: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

// ============================================================================
// JSON Files
// ============================================================================

/// One `<key>.json` file per list inside a data directory.
#[derive(Debug, Clone)]
pub struct JsonListStore {
    dir: PathBuf,
}

impl JsonListStore {
    /// Use `dir` for list files, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| PersistenceError::io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, key: ListKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }
}

impl ListPersistence for JsonListStore {
    fn load(&self, key: ListKey) -> Result<Vec<String>, PersistenceError> {
        let path = self.path_for(key);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(key = key.as_str(), "No stored list, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(PersistenceError::io(&path, e)),
        };
        let ids = decode_list(key, &raw)?;
        tracing::debug!(key = key.as_str(), count = ids.len(), "Loaded stored list");
        Ok(ids)
    }

    fn save(&self, key: ListKey, ids: &[String]) -> Result<(), PersistenceError> {
        let body = serde_json::to_vec(ids)?;
        let path = self.path_for(key);
        atomic_write(&path, &body)?;
        tracing::debug!(key = key.as_str(), count = ids.len(), "Saved list");
        Ok(())
    }

    fn remove(&self, key: ListKey) -> Result<(), PersistenceError> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(key = key.as_str(), "Removed stored list");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PersistenceError::io(&path, e)),
        }
    }

    fn quarantine(&self, key: ListKey) -> Result<(), PersistenceError> {
        let path = self.path_for(key);
        let aside = self.dir.join(format!(
            "{}.json.corrupt.{}",
            key.as_str(),
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        ));
        std::fs::rename(&path, &aside).map_err(|e| PersistenceError::io(&path, e))?;
        tracing::warn!(
            key = key.as_str(),
            moved_to = %aside.display(),
            "Moved unreadable list aside"
        );
        Ok(())
    }
}

/// Write `content` to `dst` via a temp file and rename so `dst` is never
/// left partially written.
fn atomic_write(dst: &Path, content: &[u8]) -> Result<(), PersistenceError> {
    use std::time::{SystemTime, UNIX_EPOCH};
    // Timestamped, not secret. create_new fails if anything (a symlink
    // included) already sits at the temp path.
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = dst.with_extension(format!("tmp.{:016x}", stamp));

    let cleanup = |e: std::io::Error| {
        let _ = std::fs::remove_file(&temp_path);
        PersistenceError::io(&temp_path, e)
    };

    let mut temp_file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .map_err(|e| PersistenceError::io(&temp_path, e))?;

    temp_file.write_all(content).map_err(cleanup)?;
    temp_file.sync_all().map_err(cleanup)?;
    drop(temp_file);

    // On Windows, rename fails if destination exists
    #[cfg(windows)]
    if dst.exists() {
        std::fs::remove_file(dst).map_err(cleanup)?;
    }

    std::fs::rename(&temp_path, dst).map_err(cleanup)?;
    Ok(())
}

// ============================================================================
// In-Memory
// ============================================================================

/// Raw-JSON map implementation. Clones share the same entries, so a test can
/// keep a handle and inspect what the store wrote.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLists {
    entries: Arc<Mutex<HashMap<ListKey, String>>>,
}

impl InMemoryLists {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry with arbitrary (possibly malformed) content.
    pub fn with_raw(self, key: ListKey, raw: impl Into<String>) -> Self {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, raw.into());
        }
        self
    }

    /// Current raw content of an entry, if present.
    pub fn raw(&self, key: ListKey) -> Option<String> {
        self.entries.lock().ok()?.get(&key).cloned()
    }
}

impl ListPersistence for InMemoryLists {
    fn load(&self, key: ListKey) -> Result<Vec<String>, PersistenceError> {
        let raw = self
            .entries
            .lock()
            .map_err(|_| PersistenceError::Poisoned)?
            .get(&key)
            .cloned();
        match raw {
            Some(raw) => decode_list(key, &raw),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, key: ListKey, ids: &[String]) -> Result<(), PersistenceError> {
        let raw = serde_json::to_string(ids)?;
        self.entries
            .lock()
            .map_err(|_| PersistenceError::Poisoned)?
            .insert(key, raw);
        Ok(())
    }

    fn remove(&self, key: ListKey) -> Result<(), PersistenceError> {
        self.entries
            .lock()
            .map_err(|_| PersistenceError::Poisoned)?
            .remove(&key);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
