//! Key/value blob stores
//!
//! The selection is persisted as an opaque blob under a fixed key. Two
//! backends exist:
//!
//! - `FileBlobStore`: one file per key inside a session directory, written
//!   atomically (temp file, sync, rename)
//! - `MemoryBlobStore`: a map in memory, for ephemeral sessions and tests

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::{StorageError, StorageResult};

/// Minimal get/set/remove storage for serialized blobs
pub trait BlobStore {
    /// Read the blob stored under `key`, if any
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Store `data` under `key`, replacing any previous blob
    fn set(&mut self, key: &str, data: &[u8]) -> StorageResult<()>;

    /// Delete the blob under `key` (missing keys are fine)
    fn remove(&mut self, key: &str) -> StorageResult<()>;

    /// Delete every blob; this ends the session
    fn clear(&mut self) -> StorageResult<()>;

    /// Where blobs are kept on disk, if anywhere
    fn location(&self) -> Option<&Path> {
        None
    }
}

/// Blob store backed by a session directory
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    /// Use `dir` as the session directory (created lazily on first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl BlobStore for FileBlobStore {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadError { path, source: e }),
        }
    }

    fn set(&mut self, key: &str, data: &[u8]) -> StorageResult<()> {
        let path = self.path_for(key)?;
        atomic_write(&path, data)
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::from_io(e, path)),
        }
    }

    /// Removes the whole session directory
    fn clear(&mut self) -> StorageResult<()> {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => {
                debug!(dir = ?self.dir, "Removed session directory");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::from_io(e, self.dir.clone())),
        }
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.dir)
    }
}

/// Blob store held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: HashMap<String, Vec<u8>>,
    reject_writes: bool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail with a quota error
    pub fn full() -> Self {
        Self {
            blobs: HashMap::new(),
            reject_writes: true,
        }
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.blobs.get(key).cloned())
    }

    fn set(&mut self, key: &str, data: &[u8]) -> StorageResult<()> {
        if self.reject_writes {
            return Err(StorageError::DiskFull {
                path: PathBuf::from(key),
                source: io::Error::new(io::ErrorKind::Other, "quota exceeded"),
            });
        }
        self.blobs.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.blobs.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> StorageResult<()> {
        self.blobs.clear();
        Ok(())
    }
}

/// Keys become file names, so keep them to a safe alphabet
fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StorageError::from_io(e, parent.to_path_buf()))?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}
