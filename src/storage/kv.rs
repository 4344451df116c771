//! # Key-Value Store
//!
//! The storage primitive underneath the whole data layer: an opaque,
//! asynchronous, string-keyed store supporting get/set/remove. No querying,
//! no transactions — every collection lives as one serialized value under
//! one key, and [`crate::storage::Database`] does the rest in memory.
//!
//! ## Backends
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      KEY-VALUE BACKENDS                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  KeyValueStore Trait                                            │   │
//! │  │  ───────────────────                                             │   │
//! │  │                                                                 │   │
//! │  │  • get(key)          - Read a value (None if absent)           │   │
//! │  │  • set(key, value)   - Write a value                           │   │
//! │  │  • remove(key)       - Delete a value                          │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌───────────────────────┐      ┌───────────────────────┐             │
//! │  │     MemoryStore       │      │      FileStore        │             │
//! │  │                       │      │                       │             │
//! │  │ - HashMap behind a    │      │ - One file per key    │             │
//! │  │   RwLock              │      │   under a directory   │             │
//! │  │ - Tests, previews     │      │ - Devices, desktop    │             │
//! │  └───────────────────────┘      └───────────────────────┘             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Asynchronous string-keyed storage primitive
///
/// Implementations must be safe to share behind an `Arc` across tasks;
/// there is no locking contract beyond per-call atomicity, so two callers
/// racing on the same key get last-write-wins semantics.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete the value under `key`. Returns `true` if a value was removed.
    async fn remove(&self, key: &str) -> Result<bool>;
}

// ============================================================================
// MEMORY STORE
// ============================================================================

/// In-memory store for tests and previews
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read();
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write();
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.write();
        Ok(entries.remove(key).is_some())
    }
}

// ============================================================================
// FILE STORE
// ============================================================================

/// File-backed store: one file per key under a base directory
///
/// Keys are sanitized to file names (anything outside `[A-Za-z0-9._-]`
/// becomes `_`), so distinct keys must stay distinct after sanitization —
/// true for every key this crate uses (see [`crate::storage::database::keys`]).
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a file store rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::StorageWriteError(format!("Failed to create {:?}: {}", dir, e)))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(name)
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::StorageReadError(format!(
                "Failed to read key '{}': {}",
                key, e
            ))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        tokio::fs::write(self.path_for(key), value)
            .await
            .map_err(|e| {
                Error::StorageWriteError(format!("Failed to write key '{}': {}", key, e))
            })?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::StorageWriteError(format!(
                "Failed to remove key '{}': {}",
                key, e
            ))),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
