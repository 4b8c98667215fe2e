//! The media optimization pipeline.
//!
//! - [`discover`] finds the image files a run should consider.
//! - [`optimize`] walks each file through the skip/encode/rename state machine
//!   and reports one [`Outcome`](optimize::Outcome) per file.
//! - [`rewrite`] keeps content files pointing at renamed assets.
//!
//! Everything a run needs is bundled in a [`Context`]; the
//! [`Cache`](mediaopt_cache::Cache) is passed around explicitly.

mod discover;
pub mod error;
pub mod optimize;
pub mod rewrite;

pub use crate::discover::discover;
pub use crate::optimize::{OptimizeEvent, Outcome, Report, SkipReason, Summary, optimize, process_file, run};
pub use crate::rewrite::rewrite_references;
use mediaopt_cache::CacheStore;
use mediaopt_codec::{CodecHandle, Search, WebpCodec};
use mediaopt_config::Config;
use std::path::PathBuf;
use std::sync::Arc;

/// Per-run switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Reprocess assets even when the cache says they're up to date.
    pub force: bool,
    /// Report what would be processed without touching anything on disk.
    pub dry_run: bool,
}

/// Everything a run needs, resolved to absolute paths.
#[derive(Clone)]
pub struct Context {
    /// Root of the site; content globs are relative to it.
    pub app_root: PathBuf,
    /// Directory against which explicit path arguments are resolved.
    pub working_dir: PathBuf,
    /// Only files strictly inside this directory are ever processed.
    pub media_root: PathBuf,
    /// URL prefix the media root is served under (`/media`).
    pub public_prefix: String,
    pub content_globs: Vec<String>,
    pub cache: CacheStore,
    pub search: Search,
    pub codec: CodecHandle,
    pub options: Options,
}

impl Context {
    /// Build a context for the site at `app_root` (which should be absolute)
    /// using the WebP codec.
    pub fn new(app_root: impl Into<PathBuf>, config: &Config, options: Options) -> Self {
        let app_root = app_root.into();
        Self {
            working_dir: app_root.clone(),
            media_root: config.media_root(&app_root),
            public_prefix: config.public_prefix.clone(),
            content_globs: config.content_globs.clone(),
            cache: CacheStore::new(config.cache_path(&app_root)),
            search: config.search(),
            codec: Arc::new(WebpCodec),
            options,
            app_root,
        }
    }

    pub fn with_working_dir(mut self, working_dir: impl Into<PathBuf>) -> Self {
        self.working_dir = working_dir.into();
        self
    }

    pub fn with_codec(mut self, codec: CodecHandle) -> Self {
        self.codec = codec;
        self
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("app_root", &self.app_root)
            .field("working_dir", &self.working_dir)
            .field("media_root", &self.media_root)
            .field("public_prefix", &self.public_prefix)
            .field("content_globs", &self.content_globs)
            .field("cache", &self.cache)
            .field("search", &self.search)
            .field("codec", &self.codec.target())
            .field("options", &self.options)
            .finish()
    }
}
