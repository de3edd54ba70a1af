//! # Configuration for tldr
//!
//! The `config.toml` file holds the page source, cache and proxy settings.
//! It is created with defaults on first run. [`Config::settings`] validates
//! it and resolves derived values into the [`Settings`] the finder consumes.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

use crate::error::TldrError;

/// Version of the tldr client specification this client follows.
pub const CLIENT_SPEC_VERSION: &str = "1.5";

const DEFAULT_PAGE_SOURCE: &str = "https://raw.githubusercontent.com/tldr-pages/tldr/main/pages";
const DEFAULT_DOWNLOAD_URL: &str = "https://tldr-pages.github.io/assets/tldr.zip";
const DEFAULT_TIMEOUT_HOURS: f64 = 24.0;
const INDEX_FILE_NAME: &str = "index.json";

/// Contents of `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the page tree.
    pub page_source: String,
    /// Fixed language, empty to follow the locale.
    pub language: String,
    /// Fixed platform, empty to detect the host OS.
    pub platform: String,
    pub proxy_url: String,
    pub cache: CacheConfig,
}

/// The `[cache]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Page TTL in hours.
    pub timeout: f64,
    /// Index TTL in hours, defaults to `timeout`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_timeout: Option<f64>,
    /// URL of the bulk pages archive.
    pub download_url: String,
    /// URL of the command manifest, defaults to `index.json` next to `download_url`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub index_url: String,
    /// Cache root, defaults to `<cache_dir>/tldr`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub location: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_source: DEFAULT_PAGE_SOURCE.to_string(),
            language: String::new(),
            platform: String::new(),
            proxy_url: String::new(),
            cache: CacheConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout: DEFAULT_TIMEOUT_HOURS,
            index_timeout: None,
            download_url: DEFAULT_DOWNLOAD_URL.to_string(),
            index_url: String::new(),
            location: String::new(),
        }
    }
}

/// Fully resolved configuration handed to the page finder.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub source_url: String,
    /// Page TTL in hours.
    pub cache_timeout: f64,
    /// Index TTL in hours.
    pub index_timeout: f64,
    pub cache_location: PathBuf,
    pub download_url: String,
    pub index_url: String,
    pub cache_enabled: bool,
    pub proxy_url: Option<String>,
}

impl Config {
    /// Location of the default config file, `<config_dir>/tldr/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Failed to locate config directory")?
            .join("tldr")
            .join("config.toml"))
    }

    /// Load a `Config` from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.as_ref().display()))?;

        let parsed: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML from {}", path.as_ref().display()))?;

        Ok(parsed)
    }

    /// Save the `Config` to disk as a TOML file, creating parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_str = toml::to_string(self).context("Failed to serialize config to TOML")?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, toml_str)
            .with_context(|| format!("Failed to write to {}", path.as_ref().display()))?;
        Ok(())
    }

    /// Load the given file, or the default one, writing defaults if it is missing.
    pub fn load_or_init(custom: Option<&Path>) -> Result<Self> {
        if let Some(path) = custom {
            eprintln!("{}", format!("Using config file from {}", path.display()).yellow());
            return Config::load(path);
        }

        let path = Config::default_path()?;
        Config::load_or_create(&path)
    }

    /// Load `path`, creating it with default values first if it does not exist.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            debug!(path = %path.display(), "loading config");
            return Config::load(path);
        }

        eprintln!("{}", "No config file found, setting it up...".yellow());
        let config = Config::default();
        config.save(path)?;
        eprintln!("{}", format!("Config file created: {}", path.display()).yellow());
        Ok(config)
    }

    /// Validate and resolve into [`Settings`].
    ///
    /// # Errors
    /// Returns [`TldrError::Config`] if a URL is empty or malformed, a timeout
    /// is not a positive number, or no cache directory can be determined.
    pub fn settings(&self) -> crate::error::Result<Settings> {
        if self.page_source.trim().is_empty() {
            return Err(TldrError::Config("page_source must not be empty".into()));
        }
        if self.cache.download_url.trim().is_empty() {
            return Err(TldrError::Config("cache.download_url must not be empty".into()));
        }

        let cache_timeout = positive_hours("cache.timeout", self.cache.timeout)?;
        let index_timeout = match self.cache.index_timeout {
            Some(hours) => positive_hours("cache.index_timeout", hours)?,
            None => cache_timeout,
        };

        let index_url = if self.cache.index_url.is_empty() {
            sibling_url(&self.cache.download_url, INDEX_FILE_NAME)?
        } else {
            self.cache.index_url.clone()
        };

        let cache_location = if self.cache.location.is_empty() {
            dirs::cache_dir()
                .ok_or_else(|| TldrError::Config("Failed to locate cache directory".into()))?
                .join("tldr")
        } else {
            PathBuf::from(&self.cache.location)
        };

        Ok(Settings {
            source_url: self.page_source.clone(),
            cache_timeout,
            index_timeout,
            cache_location,
            download_url: self.cache.download_url.clone(),
            index_url,
            cache_enabled: self.cache.enabled,
            proxy_url: Some(self.proxy_url.clone()).filter(|p| !p.is_empty()),
        })
    }
}

fn positive_hours(key: &str, hours: f64) -> crate::error::Result<f64> {
    // Also rejects NaN
    if hours > 0.0 {
        Ok(hours)
    } else {
        Err(TldrError::Config(format!("{key} must be a positive number of hours, got {hours}")))
    }
}

/// Replace the last path segment of `base` with `file`.
fn sibling_url(base: &str, file: &str) -> crate::error::Result<String> {
    let url = Url::parse(base)
        .and_then(|u| u.join(file))
        .map_err(|e| TldrError::Config(format!("Invalid download_url {base}: {e}")))?;
    Ok(url.to_string())
}
