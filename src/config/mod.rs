//! Configuration management for the vestnik crawler
//!
//! This module handles loading and validating configuration from TOML files
//! and environment variables.

pub mod interval;

pub use interval::{format_interval, parse_interval};

use crate::error::{Error, Result};
use crate::models::{Category, Source};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fetcher configuration
    pub fetcher: FetcherConfig,

    /// Storage configuration
    pub storage: StorageConfig,

    /// Auto-schedule configuration
    pub scheduler: SchedulerConfig,

    /// Per-source settings keyed by source name
    pub sources: HashMap<Source, SourceSettings>,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Fetcher-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Capacity of the global concurrency gate shared across all sources
    pub max_concurrent_requests: usize,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 50,
            request_timeout_secs: 45,
        }
    }
}

/// Storage configuration
///
/// The cursor database is deliberately separate from the article database so
/// crawl progress survives restarts without article-table transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database path for articles
    pub articles_path: PathBuf,

    /// SQLite database path for resume cursors
    pub cursor_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            articles_path: PathBuf::from("data/articles.db"),
            cursor_path: PathBuf::from("data/cursors.db"),
        }
    }
}

/// Auto-schedule configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Enable auto-scheduling at startup
    pub auto_enabled: bool,

    /// Fixed delay between runs, in `XdYhZm` form (e.g. "2d5h10m")
    pub interval: Option<String>,
}

impl SchedulerConfig {
    /// Parse the configured interval, if any
    pub fn parsed_interval(&self) -> Result<Option<Duration>> {
        self.interval
            .as_deref()
            .map(interval::parse_interval)
            .transpose()
    }
}

/// Per-source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Whether this source participates in runs (runtime-mutable)
    pub enabled: bool,

    /// Rate limit in requests per second, independent of other sources
    pub rate_limit: u32,

    /// Category to listing-path overrides; when absent the source's
    /// built-in section map is used
    pub categories: Option<HashMap<Category, Vec<String>>>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            rate_limit: 5,
            categories: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let sources = Source::all()
            .into_iter()
            .map(|source| (source, SourceSettings::default()))
            .collect();

        Self {
            fetcher: FetcherConfig::default(),
            storage: StorageConfig::default(),
            scheduler: SchedulerConfig::default(),
            sources,
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, filling absent sections with
    /// defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("failed to read {}: {e}", path.display())))?;

        let mut config: Self = toml::from_str(&content)
            .map_err(|e| Error::config(format!("failed to parse {}: {e}", path.display())))?;

        // Sources omitted from the file still exist, with defaults
        for source in Source::all() {
            config.sources.entry(source).or_default();
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables over defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = std::env::var("VESTNIK_MAX_CONCURRENT_REQUESTS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.fetcher.max_concurrent_requests = v;
        }
        if let Some(v) = std::env::var("VESTNIK_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.fetcher.request_timeout_secs = v;
        }
        if let Ok(v) = std::env::var("VESTNIK_ARTICLES_DB") {
            config.storage.articles_path = v.into();
        }
        if let Ok(v) = std::env::var("VESTNIK_CURSOR_DB") {
            config.storage.cursor_path = v.into();
        }
        if let Ok(v) = std::env::var("VESTNIK_AUTO_INTERVAL") {
            config.scheduler.interval = Some(v);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.fetcher.max_concurrent_requests == 0 {
            return Err(Error::config("max_concurrent_requests must be greater than 0"));
        }
        if self.fetcher.request_timeout_secs == 0 {
            return Err(Error::config("request_timeout_secs must be greater than 0"));
        }
        for (source, settings) in &self.sources {
            if settings.rate_limit == 0 {
                return Err(Error::config(format!("rate_limit for {source} must be greater than 0")));
            }
        }
        // A malformed interval is a config error; a zero one merely keeps
        // auto-scheduling disabled and is caught at enable time.
        if let Err(e @ Error::InvalidInterval(_)) = self.scheduler.parsed_interval() {
            return Err(e);
        }
        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.fetcher.request_timeout_secs)
    }

    /// Settings for one source (defaults if somehow missing)
    pub fn source_settings(&self, source: Source) -> SourceSettings {
        self.sources.get(&source).cloned().unwrap_or_default()
    }
}
