//! Document persistence
//!
//! Canonical Markdown is written to durable storage keyed by a
//! per-conversation identifier on every change and read back when a surface
//! is (re)opened. This module defines that contract ([`DocumentStore`]) and
//! two implementations: an in-memory map and a JSON file in the platform
//! data directory with robust error handling and graceful fallback.
//!
//! Store failures are never fatal to editing: the sync layer catches and
//! logs them, and the document lives on in memory for the session.

use crate::error::{Error, Result};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Application name used for the data directory
const APP_NAME: &str = "redraft";

/// Document store file name
const STORE_FILE_NAME: &str = "documents.json";

/// Backup store file name (used during atomic writes)
const STORE_BACKUP_NAME: &str = "documents.json.bak";

/// Storage key used when no conversation identifier is available.
pub const DEFAULT_KEY: &str = "default";

/// Derive the storage key for a conversation, falling back to
/// [`DEFAULT_KEY`] when no identifier is available.
pub fn storage_key(conversation_id: Option<&str>) -> String {
    match conversation_id {
        Some(id) if !id.trim().is_empty() => id.to_string(),
        _ => DEFAULT_KEY.to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Store Contract
// ─────────────────────────────────────────────────────────────────────────────

/// Durable storage for canonical Markdown documents.
pub trait DocumentStore {
    /// Read the document stored under `key`, if any.
    fn load(&self, key: &str) -> Option<String>;

    /// Write `markdown` under `key`. Callers at the sync boundary treat a
    /// failure as non-fatal.
    fn save(&mut self, key: &str, markdown: &str) -> Result<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// In-Memory Store
// ─────────────────────────────────────────────────────────────────────────────

/// A store that keeps documents in memory only. Used in tests and when no
/// durable backend is available.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents held.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.documents.get(key).cloned()
    }

    fn save(&mut self, key: &str, markdown: &str) -> Result<()> {
        self.documents.insert(key.to_string(), markdown.to_string());
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File-Backed Store
// ─────────────────────────────────────────────────────────────────────────────

/// Get the platform-specific data directory for the application.
///
/// # Errors
///
/// Returns `Error::StoreDirNotFound` if the data directory cannot be
/// determined (e.g., if the HOME environment variable is not set).
pub fn get_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(Error::StoreDirNotFound)
}

/// Get the full path to the document store file.
pub fn get_store_file_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join(STORE_FILE_NAME))
}

/// A store persisted as a single JSON map file.
///
/// Loads eagerly on open; every save rewrites the file with an atomic
/// write-backup-then-rename. A missing, empty, or corrupted file degrades
/// to an empty store with a logged warning — opening never fails because
/// of bad on-disk data.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    documents: HashMap<String, String>,
}

impl FileStore {
    /// Open the store at the default platform location.
    pub fn open_default() -> Result<Self> {
        Ok(Self::open(get_store_file_path()?))
    }

    /// Open a store backed by the given file.
    pub fn open(path: PathBuf) -> Self {
        let documents = match read_documents(&path) {
            Ok(documents) => documents,
            Err(err) => {
                warn!(
                    "Failed to load document store from {}: {}. Starting empty.",
                    path.display(),
                    err
                );
                HashMap::new()
            }
        };
        debug!(
            "Opened document store at {} ({} documents)",
            path.display(),
            documents.len()
        );
        Self { path, documents }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current document map to disk atomically.
    fn write_documents(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                debug!("Creating data directory: {}", parent.display());
                fs::create_dir_all(parent).map_err(|e| Error::StoreSave {
                    path: parent.to_path_buf(),
                    source: Box::new(e),
                })?;
            }
        }

        let json = serde_json::to_string_pretty(&self.documents).map_err(|e| Error::StoreSave {
            path: self.path.clone(),
            source: Box::new(e),
        })?;

        // Write to backup file first (atomic write pattern)
        let backup_path = self.path.with_file_name(STORE_BACKUP_NAME);
        fs::write(&backup_path, &json).map_err(|e| Error::StoreSave {
            path: backup_path.clone(),
            source: Box::new(e),
        })?;

        // Replace original with backup
        fs::rename(&backup_path, &self.path).map_err(|e| Error::StoreSave {
            path: self.path.clone(),
            source: Box::new(e),
        })?;

        info!("Document store saved to {}", self.path.display());
        Ok(())
    }
}

impl DocumentStore for FileStore {
    fn load(&self, key: &str) -> Option<String> {
        self.documents.get(key).cloned()
    }

    fn save(&mut self, key: &str, markdown: &str) -> Result<()> {
        self.documents.insert(key.to_string(), markdown.to_string());
        self.write_documents()
    }
}

/// Read the document map from disk. A missing or empty file is an empty
/// map; unreadable or unparseable data is an error (the caller degrades).
fn read_documents(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        debug!("Store file not found at {}, starting empty", path.display());
        return Ok(HashMap::new());
    }

    let contents = fs::read_to_string(path).map_err(|e| Error::StoreLoad {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    if contents.trim().is_empty() {
        debug!("Store file is empty, starting empty");
        return Ok(HashMap::new());
    }

    serde_json::from_str(&contents).map_err(|e| Error::StoreLoad {
        path: path.to_path_buf(),
        source: Box::new(e),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(temp_dir: &TempDir) -> FileStore {
        FileStore::open(temp_dir.path().join(STORE_FILE_NAME))
    }

    #[test]
    fn test_storage_key_from_conversation_id() {
        assert_eq!(storage_key(Some("conv-42")), "conv-42");
    }

    #[test]
    fn test_storage_key_fallback() {
        assert_eq!(storage_key(None), "default");
        assert_eq!(storage_key(Some("")), "default");
        assert_eq!(storage_key(Some("   ")), "default");
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load("a"), None);

        store.save("a", "# Doc").unwrap();
        assert_eq!(store.load("a").as_deref(), Some("# Doc"));

        store.save("a", "# Updated").unwrap();
        assert_eq!(store.load("a").as_deref(), Some("# Updated"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().expect("temp dir");
        let mut store = store_in(&temp_dir);

        store.save("conv-1", "# First\n\nbody").unwrap();
        store.save("conv-2", "second").unwrap();

        // A fresh open sees what was written
        let reopened = store_in(&temp_dir);
        assert_eq!(reopened.load("conv-1").as_deref(), Some("# First\n\nbody"));
        assert_eq!(reopened.load("conv-2").as_deref(), Some("second"));
        assert_eq!(reopened.load("conv-3"), None);
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let temp_dir = TempDir::new().expect("temp dir");
        let store = store_in(&temp_dir);
        assert_eq!(store.load("anything"), None);
    }

    #[test]
    fn test_file_store_empty_file_is_empty() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join(STORE_FILE_NAME);
        fs::write(&path, "").unwrap();

        let store = FileStore::open(path);
        assert_eq!(store.load("anything"), None);
    }

    #[test]
    fn test_file_store_corrupted_file_degrades_to_empty() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join(STORE_FILE_NAME);
        fs::write(&path, "{ not valid json").unwrap();

        let store = FileStore::open(path.clone());
        assert_eq!(store.load("anything"), None);

        // Saving over a corrupted file recovers it
        let mut store = store;
        store.save("k", "v").unwrap();
        let reopened = FileStore::open(path);
        assert_eq!(reopened.load("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_file_store_creates_parent_directory() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("nested").join("dir").join(STORE_FILE_NAME);

        let mut store = FileStore::open(path.clone());
        store.save("k", "v").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_file_store_no_backup_left_behind() {
        let temp_dir = TempDir::new().expect("temp dir");
        let mut store = store_in(&temp_dir);
        store.save("k", "v").unwrap();

        assert!(!temp_dir.path().join(STORE_BACKUP_NAME).exists());
    }

    #[test]
    fn test_file_store_persists_valid_json() {
        let temp_dir = TempDir::new().expect("temp dir");
        let mut store = store_in(&temp_dir);
        store.save("k", "line one\nline two").unwrap();

        let contents = fs::read_to_string(store.path()).unwrap();
        let map: HashMap<String, String> = serde_json::from_str(&contents).unwrap();
        assert_eq!(map.get("k").map(String::as_str), Some("line one\nline two"));
    }

    #[test]
    fn test_get_data_dir_contains_app_name() {
        if let Ok(dir) = get_data_dir() {
            assert!(dir.to_string_lossy().contains(APP_NAME));
        }
    }
}
