//! Layered configuration for mediaopt.
//!
//! Sources are merged with [`figment`], later ones overriding earlier ones:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. The user's `config.toml` in the platform config directory
//! 3. `mediaopt.toml` in the application root
//! 4. An explicit file passed with [`ConfigLoader::with_file`]
//! 5. Environment variables prefixed `MEDIAOPT_`, with `__` separating
//!    nested keys (`MEDIAOPT_ENCODING__MAX_BYTES=1048576`)

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use mediaopt_codec::Search;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the per-project configuration file, looked up in the app root.
pub const PROJECT_CONFIG_FILE: &str = "mediaopt.toml";
/// Prefix of environment variables that override configuration.
pub const ENV_PREFIX: &str = "MEDIAOPT_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the media assets, relative to the app root.
    pub media_root: PathBuf,
    /// URL prefix under which the media root is served.
    pub public_prefix: String,
    /// Cache file location, relative to the app root.
    pub cache_file: PathBuf,
    /// Glob patterns (relative to the app root) selecting the content files
    /// whose references get rewritten after a rename.
    pub content_globs: Vec<String>,
    pub encoding: EncodingConfig,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            media_root: PathBuf::from("public/media"),
            public_prefix: "/media".to_string(),
            cache_file: PathBuf::from(".media-optim-cache.json"),
            content_globs: vec![
                "src/content/**/*.{md,mdx,json}".to_string(),
                "src/**/*.{astro,ts,tsx,js,jsx}".to_string(),
            ],
            encoding: EncodingConfig::default(),
        }
    }
}

/// Byte budget and quality ladder for re-encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    pub max_bytes: u64,
    pub quality: u8,
    pub min_quality: u8,
    pub step: u8,
}
impl Default for EncodingConfig {
    fn default() -> Self {
        let search = Search::default();
        Self {
            max_bytes: search.max_bytes,
            quality: search.start,
            min_quality: search.floor,
            step: search.step,
        }
    }
}
impl From<EncodingConfig> for Search {
    fn from(config: EncodingConfig) -> Self {
        Self {
            start: config.quality,
            floor: config.min_quality,
            step: config.step,
            max_bytes: config.max_bytes,
        }
    }
}

impl Config {
    /// Absolute media root for an application rooted at `app_root`.
    pub fn media_root(&self, app_root: &Path) -> PathBuf {
        app_root.join(&self.media_root)
    }

    /// Absolute cache file path for an application rooted at `app_root`.
    pub fn cache_path(&self, app_root: &Path) -> PathBuf {
        app_root.join(&self.cache_file)
    }

    pub fn search(&self) -> Search {
        self.encoding.into()
    }

    pub fn validate(&self) -> Result<()> {
        let encoding = &self.encoding;
        if encoding.quality > 100 {
            exn::bail!(ErrorKind::Invalid(format!("encoding.quality must be at most 100, got {}", encoding.quality)));
        }
        if encoding.min_quality > encoding.quality {
            exn::bail!(ErrorKind::Invalid(format!(
                "encoding.min_quality ({}) is above encoding.quality ({})",
                encoding.min_quality, encoding.quality
            )));
        }
        if encoding.step == 0 {
            exn::bail!(ErrorKind::Invalid("encoding.step must be at least 1".to_string()));
        }
        if encoding.max_bytes == 0 {
            exn::bail!(ErrorKind::Invalid("encoding.max_bytes must be at least 1".to_string()));
        }
        if !self.public_prefix.starts_with('/') {
            exn::bail!(ErrorKind::Invalid(format!("public_prefix must start with '/', got {:?}", self.public_prefix)));
        }
        if self.content_globs.is_empty() || self.content_globs.iter().any(|g| g.trim().is_empty()) {
            exn::bail!(ErrorKind::Invalid("content_globs must contain non-empty patterns".to_string()));
        }
        Ok(())
    }
}

/// Location of the per-user configuration file, if the platform has one.
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "mediaopt").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Builds the layered [`Figment`] for an application root.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    app_root: PathBuf,
    user_config: Option<PathBuf>,
    extra: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new(app_root: impl Into<PathBuf>) -> Self {
        Self { app_root: app_root.into(), user_config: user_config_path(), extra: None }
    }

    /// Override (or with `None`, disable) the per-user configuration file.
    pub fn with_user_config(mut self, path: Option<PathBuf>) -> Self {
        self.user_config = path;
        self
    }

    /// Merge an explicit configuration file above the project file.
    ///
    /// Relative paths are resolved against the application root.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.extra = Some(self.app_root.join(path));
        self
    }

    pub fn figment(&self) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(user) = &self.user_config {
            figment = figment.merge(Toml::file(user));
        }
        figment = figment.merge(Toml::file(self.app_root.join(PROJECT_CONFIG_FILE)));
        if let Some(extra) = &self.extra {
            figment = figment.merge(Toml::file(extra));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Extract and validate the merged configuration.
    pub fn load(&self) -> Result<Config> {
        // Missing files are silently empty to figment; an explicit one isn't.
        if let Some(extra) = self.extra.as_ref().filter(|p| !p.is_file()) {
            exn::bail!(ErrorKind::MissingFile(extra.clone()));
        }
        let config: Config = self.figment().extract().map_err(|e| ErrorKind::Load(e.to_string()))?;
        config.validate()?;
        debug!(?config, "loaded configuration");
        Ok(config)
    }
}
