//! Configuration management for edisclose.
//!
//! Configuration is optional. When no file is given on the command line (or
//! via `EDISCLOSE_CONFIG`), `edisclose.toml` and then `edisclose.json` are
//! looked up in the working directory; otherwise built-in defaults are used.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crawl::CrawlConfig;
use crate::scrapers::{BrowserEngineConfig, PortalConfig, SearchConfig};

/// Config file names probed in the working directory, in order.
pub const DEFAULT_CONFIG_FILENAMES: &[&str] = &["edisclose.toml", "edisclose.json"];

/// Default cache database, relative to the working directory.
pub const DEFAULT_CACHE_PATH: &str = "disclosures.db";

/// Default report output directory, relative to the working directory.
pub const DEFAULT_REPORTS_DIR: &str = "reports";

/// Environment variable holding a remote DevTools URL for the browser.
pub const BROWSER_URL_ENV: &str = "EDISCLOSE_BROWSER_URL";

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to parse JSON config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Portal endpoints and page layout.
    pub portal: PortalConfig,
    /// Fixed part of the search payload.
    pub search: SearchConfig,
    /// Browser used for cookie bootstrap.
    pub browser: BrowserEngineConfig,
    /// Crawl cadence and limits.
    pub crawl: CrawlConfig,
    /// SQLite cache file.
    pub cache_path: PathBuf,
    /// Directory that receives report files.
    pub reports_dir: PathBuf,
    /// File this config was loaded from, if any.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            portal: PortalConfig::default(),
            search: SearchConfig::default(),
            browser: BrowserEngineConfig::default(),
            crawl: CrawlConfig::default(),
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            reports_dir: PathBuf::from(DEFAULT_REPORTS_DIR),
            source_path: None,
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist and parse. Without one, the default file
    /// names are probed in `dir`; if none exists the defaults are used.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => Self::load_from_path(path)?,
            None => match Self::discover(dir) {
                Some(path) => Self::load_from_path(&path)?,
                None => Self::default(),
            },
        };
        Ok(config.with_env_overrides())
    }

    /// Find the first default config file present in `dir`.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_FILENAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Parse a config file; the format is picked by extension (TOML unless
    /// the file ends in `.json`).
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let mut config: Config = match extension.as_str() {
            "json" => serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?,
            _ => toml::from_str(&contents).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            })?,
        };

        config.source_path = Some(path.to_path_buf());
        config.resolve_relative_paths();
        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(BROWSER_URL_ENV) {
            if !url.trim().is_empty() {
                self.browser.remote_url = Some(url);
            }
        }
        self
    }

    /// Directory of the config file, used to anchor relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Anchor relative cache/report/cookie paths at the config file's
    /// directory.
    fn resolve_relative_paths(&mut self) {
        let Some(base) = self.base_dir() else {
            return;
        };
        if base.as_os_str().is_empty() {
            return;
        }

        let resolve = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base.join(p)
            }
        };

        self.cache_path = resolve(&self.cache_path);
        self.reports_dir = resolve(&self.reports_dir);
        if let Some(ref cookies) = self.browser.cookies_file {
            self.browser.cookies_file = Some(resolve(cookies));
        }
    }
}
