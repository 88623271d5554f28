//! Byte storage for encrypted document content.
//!
//! The engine addresses blobs by document id and only ever writes
//! ciphertext, so backends need no knowledge of keys or users. `ByteStore`
//! is the seam for swapping backends (local directory, object storage, ...);
//! `MemoryByteStore` backs the test suites.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

// ============================================================================
// Error types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("blob not found: {0}")]
    NotFound(String),
    #[error("invalid blob key: {0}")]
    InvalidKey(String),
    #[error("storage error: {0}")]
    Storage(String),
}

pub type BlobResult<T> = Result<T, BlobError>;

// ============================================================================
// ByteStore
// ============================================================================

/// Keyed byte storage.
pub trait ByteStore: Send + Sync {
    /// Reads a blob. `NotFound` if the key does not exist.
    fn read(&self, key: &str) -> BlobResult<Vec<u8>>;

    /// Writes a blob, replacing any existing data for the key.
    fn write(&self, key: &str, data: &[u8]) -> BlobResult<()>;

    /// Deletes a blob. `NotFound` if the key does not exist.
    fn delete(&self, key: &str) -> BlobResult<()>;

    /// Lists all stored keys.
    fn list(&self) -> BlobResult<Vec<String>>;
}

// ============================================================================
// LocalFileStore
// ============================================================================

/// Directory-rooted blob storage, one file per key.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl AsRef<Path>) -> BlobResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| BlobError::Storage(e.to_string()))?;
        Ok(Self { root })
    }

    /// Keys are document ids (hex); anything that could escape the root
    /// directory is rejected.
    fn path_for(&self, key: &str) -> BlobResult<PathBuf> {
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
            || key.starts_with('.')
        {
            return Err(BlobError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

impl ByteStore for LocalFileStore {
    fn read(&self, key: &str) -> BlobResult<Vec<u8>> {
        let path = self.path_for(key)?;
        if !path.is_file() {
            return Err(BlobError::NotFound(key.to_string()));
        }
        fs::read(&path).map_err(|e| BlobError::Storage(e.to_string()))
    }

    fn write(&self, key: &str, data: &[u8]) -> BlobResult<()> {
        let path = self.path_for(key)?;
        fs::write(&path, data).map_err(|e| BlobError::Storage(e.to_string()))
    }

    fn delete(&self, key: &str) -> BlobResult<()> {
        let path = self.path_for(key)?;
        if !path.is_file() {
            return Err(BlobError::NotFound(key.to_string()));
        }
        fs::remove_file(&path).map_err(|e| BlobError::Storage(e.to_string()))
    }

    fn list(&self) -> BlobResult<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| BlobError::Storage(e.to_string()))?;
        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| BlobError::Storage(e.to_string()))?;
            if entry.path().is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    keys.push(name.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

// ============================================================================
// MemoryByteStore
// ============================================================================

/// In-memory blob storage for tests.
#[derive(Default)]
pub struct MemoryByteStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryByteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ByteStore for MemoryByteStore {
    fn read(&self, key: &str) -> BlobResult<Vec<u8>> {
        self.blobs
            .lock()
            .map_err(|e| BlobError::Storage(e.to_string()))?
            .get(key)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(key.to_string()))
    }

    fn write(&self, key: &str, data: &[u8]) -> BlobResult<()> {
        self.blobs
            .lock()
            .map_err(|e| BlobError::Storage(e.to_string()))?
            .insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> BlobResult<()> {
        self.blobs
            .lock()
            .map_err(|e| BlobError::Storage(e.to_string()))?
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| BlobError::NotFound(key.to_string()))
    }

    fn list(&self) -> BlobResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .blobs
            .lock()
            .map_err(|e| BlobError::Storage(e.to_string()))?
            .keys()
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &dyn ByteStore) {
        assert!(matches!(store.read("a1"), Err(BlobError::NotFound(_))));

        store.write("a1", b"one").unwrap();
        store.write("b2", b"two").unwrap();
        assert_eq!(store.read("a1").unwrap(), b"one");

        // Overwrite replaces
        store.write("a1", b"uno").unwrap();
        assert_eq!(store.read("a1").unwrap(), b"uno");

        assert_eq!(store.list().unwrap(), vec!["a1".to_string(), "b2".to_string()]);

        store.delete("a1").unwrap();
        assert!(matches!(store.read("a1"), Err(BlobError::NotFound(_))));
        assert!(matches!(store.delete("a1"), Err(BlobError::NotFound(_))));
    }

    #[test]
    fn memory_store_contract() {
        exercise(&MemoryByteStore::new());
    }

    #[test]
    fn local_store_contract() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::open(dir.path()).unwrap();
        exercise(&store);
    }

    #[test]
    fn local_store_rejects_traversal_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::open(dir.path()).unwrap();
        assert!(matches!(store.write("../escape", b"x"), Err(BlobError::InvalidKey(_))));
        assert!(matches!(store.read("a/b"), Err(BlobError::InvalidKey(_))));
        assert!(matches!(store.read(""), Err(BlobError::InvalidKey(_))));
        assert!(matches!(store.read(".hidden"), Err(BlobError::InvalidKey(_))));
    }
}
