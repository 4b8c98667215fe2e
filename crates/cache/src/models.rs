use mediaopt_storage::FileInfo;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema version written to new cache files. Read back, but never checked.
pub const CACHE_VERSION: u32 = 1;

/// What a file looked like right after it was optimized.
///
/// Staleness is judged on these two values only; a file rewritten with the
/// same size within the same timestamp tick is indistinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint {
    #[serde(rename = "mtimeMs")]
    pub mtime_ms: f64,
    pub size: u64,
}
impl Fingerprint {
    pub fn new(mtime_ms: f64, size: u64) -> Self {
        Self { mtime_ms, size }
    }
}
impl From<&FileInfo> for Fingerprint {
    fn from(info: &FileInfo) -> Self {
        Self::new(info.modified_ms(), info.size)
    }
}

/// Public asset path (`/media/...`) to [`Fingerprint`].
///
/// Entries are kept sorted so that persisting the same cache twice produces
/// byte-identical files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cache {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub entries: BTreeMap<String, Fingerprint>,
}
fn default_version() -> u32 {
    CACHE_VERSION
}

impl Default for Cache {
    fn default() -> Self {
        Self { version: CACHE_VERSION, entries: BTreeMap::new() }
    }
}

impl Cache {
    pub fn lookup(&self, key: &str) -> Option<&Fingerprint> {
        self.entries.get(key)
    }

    /// Insert or overwrite the entry for `key`.
    pub fn record(&mut self, key: impl Into<String>, fingerprint: Fingerprint) {
        self.entries.insert(key.into(), fingerprint);
    }

    pub fn remove(&mut self, key: &str) -> Option<Fingerprint> {
        self.entries.remove(key)
    }

    /// Whether `key` is cached with exactly this fingerprint.
    pub fn is_fresh(&self, key: &str, fingerprint: &Fingerprint) -> bool {
        self.lookup(key) == Some(fingerprint)
    }

    /// Move an entry after its asset was renamed: the old key is dropped and
    /// the new key records the fingerprint of the renamed file.
    pub fn relocate(&mut self, old: &str, new: impl Into<String>, fingerprint: Fingerprint) {
        self.remove(old);
        self.record(new, fingerprint);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
