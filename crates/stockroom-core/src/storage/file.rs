//! File-backed key-value slots
//!
//! Slot `key` lives at `<data_dir>/<key>.json`. Writes go through
//! [`atomic_write`] so a crash never leaves a half-written slot behind.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::{ProviderError, ProviderResult};
use super::KvProvider;

/// Slot storage in a directory on disk
#[derive(Debug, Clone)]
pub struct FileProvider {
    data_dir: PathBuf,
}

impl FileProvider {
    /// Create a provider rooted at `data_dir`
    ///
    /// The directory is created lazily on first write.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Directory holding the slot files
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the file backing `key`
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }
}

impl KvProvider for FileProvider {
    fn get(&self, key: &str) -> ProviderResult<Option<Vec<u8>>> {
        let path = self.slot_path(key);
        match fs::read(&path) {
            Ok(bytes) => {
                debug!(key, bytes = bytes.len(), "read slot");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                Err(ProviderError::PermissionDenied { path, source: e })
            }
            Err(e) => Err(ProviderError::ReadError { path, source: e }),
        }
    }

    fn set(&self, key: &str, bytes: &[u8]) -> ProviderResult<()> {
        let path = self.slot_path(key);
        atomic_write(&path, bytes)?;
        debug!(key, bytes = bytes.len(), "wrote slot");
        Ok(())
    }

    fn remove(&self, key: &str) -> ProviderResult<()> {
        let path = self.slot_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ProviderError::from_io(e, path)),
        }
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> ProviderResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ProviderError::from_io(e, parent.to_path_buf()))?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| ProviderError::from_io(e, temp_path.clone()))?;
    file.write_all(data)
        .map_err(|e| ProviderError::from_io(e, temp_path.clone()))?;
    file.sync_all()
        .map_err(|e| ProviderError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|e| ProviderError::from_io(e, path.to_path_buf()))?;

    Ok(())
}
