use exn::ResultExt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument};

use crate::error::{ErrorKind, Result};
use crate::models::Cache;

/// File name of the cache, relative to the application root.
pub const DEFAULT_CACHE_FILE: &str = ".media-optim-cache.json";

/// Location of the cache on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cache from disk.
    ///
    /// A missing file is an empty cache, not an error. A file without an
    /// `entries` object loads as empty too.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<Cache> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("no cache file, starting empty");
                return Ok(Cache::default());
            },
            Err(err) => return Err(err).or_raise(|| ErrorKind::Read(self.path.clone())),
        };
        let cache: Cache = serde_json::from_slice(&raw).or_raise(|| ErrorKind::InvalidData(self.path.clone()))?;
        debug!(entries = cache.len(), "loaded cache");
        Ok(cache)
    }

    /// Write the cache to disk as pretty-printed, newline-terminated JSON.
    #[instrument(skip(self, cache), fields(path = %self.path.display(), entries = cache.len()))]
    pub async fn persist(&self, cache: &Cache) -> Result<()> {
        let mut json = serde_json::to_string_pretty(cache).or_raise(|| ErrorKind::Write(self.path.clone()))?;
        json.push('\n');
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.or_raise(|| ErrorKind::Write(self.path.clone()))?;
        }
        fs::write(&self.path, json).await.or_raise(|| ErrorKind::Write(self.path.clone()))?;
        debug!("persisted cache");
        Ok(())
    }
}
