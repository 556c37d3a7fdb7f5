//! Key-value storage backends
//!
//! Mirrors the shape of the browser `Storage` API: string keys, string values,
//! synchronous calls. Every call can fail (quota, private mode, I/O) and the
//! caller decides whether a failure matters.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

/// Failure of a single storage call
#[derive(Debug, Error)]
pub enum StorageError {
    /// No storage at all (no window, disabled in private browsing)
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// Write would exceed the backend's quota
    #[error("quota exceeded writing {bytes} bytes to {key:?} (quota {quota})")]
    QuotaExceeded {
        key: String,
        bytes: usize,
        quota: usize,
    },
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// Exception thrown by a browser storage call
    #[error("storage call threw: {0}")]
    Js(String),
}

/// Synchronous string key-value store
pub trait Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
struct MemoryInner {
    items: HashMap<String, String>,
    quota: Option<usize>,
    unavailable: bool,
    writes: usize,
}

impl MemoryInner {
    fn used_bytes_without(&self, key: &str) -> usize {
        self.items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

/// In-process storage. Clones share contents, so a "reloaded" store can read
/// what a previous one wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that rejects writes pushing the total past `bytes`
    /// (keys plus values, like `localStorage`)
    pub fn with_quota(bytes: usize) -> Self {
        let storage = Self::default();
        storage.inner.borrow_mut().quota = Some(bytes);
        storage
    }

    /// Simulate storage being disabled: every call fails with `Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.borrow_mut().unavailable = unavailable;
    }

    /// Successful `set_item` calls so far
    pub fn write_count(&self) -> usize {
        self.inner.borrow().writes
    }

    /// Raw stored value, bypassing availability checks
    pub fn peek(&self, key: &str) -> Option<String> {
        self.inner.borrow().items.get(key).cloned()
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.inner.borrow().unavailable {
            return Err(StorageError::Unavailable(
                "memory storage disabled".to_string(),
            ));
        }
        Ok(())
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        Ok(self.inner.borrow().items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_available()?;
        let mut inner = self.inner.borrow_mut();
        if let Some(quota) = inner.quota {
            let bytes = key.len() + value.len();
            if inner.used_bytes_without(key) + bytes > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    bytes,
                    quota,
                });
            }
        }
        inner.items.insert(key.to_string(), value.to_string());
        inner.writes += 1;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.check_available()?;
        self.inner.borrow_mut().items.remove(key);
        Ok(())
    }
}

/// One file per key under a directory (native only)
///
/// Writes go to a sibling temp file that is then renamed over the record, so
/// a crash mid-write leaves the previous save intact.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStorage {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    /// Path of the file backing `key`. Characters outside `[A-Za-z0-9._-]`
    /// map to `_`.
    pub fn path_for(&self, key: &str) -> std::path::PathBuf {
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
        self.dir.join(format!("{name}.json"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_clones_share_items() {
        let a = MemoryStorage::new();
        let b = a.clone();
        a.set_item("k", "v").unwrap();
        assert_eq!(b.get_item("k").unwrap().as_deref(), Some("v"));
        b.remove_item("k").unwrap();
        assert_eq!(a.get_item("k").unwrap(), None);
        assert_eq!(a.write_count(), 1);
    }

    #[test]
    fn test_memory_storage_quota() {
        let storage = MemoryStorage::with_quota(10);
        storage.set_item("k", "12345").unwrap();
        // Replacing the same key only counts the new value
        storage.set_item("k", "123456789").unwrap();
        let err = storage.set_item("k", "1234567890").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { quota: 10, .. }));
        assert_eq!(storage.peek("k").as_deref(), Some("123456789"));
    }

    #[test]
    fn test_memory_storage_unavailable() {
        let storage = MemoryStorage::new();
        storage.set_unavailable(true);
        assert!(matches!(
            storage.get_item("k"),
            Err(StorageError::Unavailable(_))
        ));
        assert!(storage.set_item("k", "v").is_err());
        storage.set_unavailable(false);
        assert!(storage.set_item("k", "v").is_ok());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_storage_round_trip() {
        let dir = std::env::temp_dir().join(format!(
            "bulldog-realm-storage-test-{}",
            std::process::id()
        ));
        let storage = FileStorage::new(&dir);
        assert_eq!(storage.get_item("save/v2").unwrap(), None);

        storage.set_item("save/v2", "{\"v\":2}").unwrap();
        assert!(storage.path_for("save/v2").ends_with("save_v2.json"));
        assert_eq!(
            storage.get_item("save/v2").unwrap().as_deref(),
            Some("{\"v\":2}")
        );

        storage.remove_item("save/v2").unwrap();
        storage.remove_item("save/v2").unwrap();
        assert_eq!(storage.get_item("save/v2").unwrap(), None);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
