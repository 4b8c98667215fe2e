//! Persisted optimization cache.
//!
//! The cache remembers, per public asset path, the size and modification time
//! the file had right after it was last optimized. It is not the source of
//! truth: if the file is deleted, every asset is simply reprocessed on the
//! next run.
//!
//! # Architecture
//! - [`Cache`] is a plain value: loaded once, mutated entry-by-entry while a
//!   run progresses, then handed back to [`CacheStore::persist`].
//! - [`CacheStore`] owns the location on disk and the JSON wire format.

pub mod error;
mod models;
mod store;

pub use crate::models::{CACHE_VERSION, Cache, Fingerprint};
pub use crate::store::{CacheStore, DEFAULT_CACHE_FILE};
