//! File metadata and whole-file operations on the local filesystem.
//!
//! All operations take absolute paths and go through `tokio::fs`, so every
//! call is a suspension point for the (single-threaded) runtime.

use crate::error::{ErrorKind, Result};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tokio::fs;

/// File metadata gathered from a `stat` call.
///
/// The `(modified, size)` pair is what the optimization cache fingerprints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Absolute path of the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modified timestamp
    pub modified: OffsetDateTime,
}
impl FileInfo {
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: OffsetDateTime) -> Self {
        Self { path: path.into(), size, modified }
    }

    /// Modification time as fractional milliseconds since the Unix epoch.
    pub fn modified_ms(&self) -> f64 {
        // Sub-millisecond precision is kept so that two writes within the same
        // millisecond still produce different fingerprints where the
        // filesystem records it.
        self.modified.unix_timestamp_nanos() as f64 / 1_000_000.0
    }

    pub(crate) fn from_metadata(path: &Path, metadata: &Metadata) -> Result<Self> {
        let modified = metadata.modified().map_err(ErrorKind::Io)?.into();
        Ok(Self::new(path, metadata.len(), modified))
    }
}

/// Get file metadata without reading contents.
///
/// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file does
/// not exist.
pub async fn stat(path: &Path) -> Result<FileInfo> {
    let metadata = fs::metadata(path).await.map_err(|e| ErrorKind::from_io(e, path))?;
    FileInfo::from_metadata(path, &metadata)
}

/// Read the complete file contents.
pub async fn read(path: &Path) -> Result<Vec<u8>> {
    Ok(fs::read(path).await.map_err(|e| ErrorKind::from_io(e, path))?)
}

/// Read the complete file contents as UTF-8 text.
pub async fn read_to_string(path: &Path) -> Result<String> {
    Ok(fs::read_to_string(path).await.map_err(|e| ErrorKind::from_io(e, path))?)
}

/// Create or overwrite a file with the provided data.
///
/// Parent directories are created as needed.
pub async fn write(path: &Path, data: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(|e| ErrorKind::from_io(e, parent))?;
    }
    Ok(fs::write(path, data).await.map_err(|e| ErrorKind::from_io(e, path))?)
}

/// Delete a file.
///
/// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file does
/// not exist.
pub async fn delete(path: &Path) -> Result<()> {
    Ok(fs::remove_file(path).await.map_err(|e| ErrorKind::from_io(e, path))?)
}

/// Check if a file exists.
pub async fn exists(path: &Path) -> Result<bool> {
    Ok(fs::try_exists(path).await.map_err(ErrorKind::Io)?)
}
