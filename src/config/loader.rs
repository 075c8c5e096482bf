//! Configuration structures and loading logic.

use crate::config::modes::SourceKind;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub targets: TargetsConfig,

    #[serde(default)]
    pub options: OptionsConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub remote: RemoteConfig,
}

/// Account targeting configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetsConfig {
    /// Account handles to fetch, in order.
    #[serde(default)]
    pub handles: Vec<String>,
}

/// Download options configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Base directory for per-account archives.
    #[serde(default)]
    pub download_directory: Option<PathBuf>,

    /// Minimum resolution (max-dimension rule) in pixels.
    #[serde(default = "default_min_resolution")]
    pub min_resolution: u32,

    /// Number of successful downloads wanted per account.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Whether to sync downloads to the remote stores.
    #[serde(default)]
    pub upload_to_remote: bool,

    /// Maximum concurrent image fetches.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-image HTTP timeout in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_seconds: u64,

    /// Largest image body accepted, in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: u64,

    /// Whole-batch deadline in seconds; partial results are kept when it expires.
    #[serde(default)]
    pub batch_timeout_seconds: Option<u64>,

    /// Base delay between accounts in milliseconds (jitter is added).
    #[serde(default = "default_account_delay")]
    pub account_delay_ms: u64,

    /// Whether to show per-item progress.
    #[serde(default = "default_true")]
    pub show_downloads: bool,

    /// Whether to show skipped items.
    #[serde(default = "default_true")]
    pub show_skipped_downloads: bool,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            download_directory: None,
            min_resolution: default_min_resolution(),
            limit: default_limit(),
            upload_to_remote: false,
            concurrency: default_concurrency(),
            fetch_timeout_seconds: default_fetch_timeout(),
            max_body_bytes: default_max_body_bytes(),
            batch_timeout_seconds: None,
            account_delay_ms: default_account_delay(),
            show_downloads: true,
            show_skipped_downloads: true,
        }
    }
}

impl OptionsConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }

    pub fn batch_timeout(&self) -> Option<Duration> {
        self.batch_timeout_seconds.map(Duration::from_secs)
    }
}

/// Candidate source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Which source to use.
    #[serde(default)]
    pub kind: SourceKind,

    /// Maximum candidates requested from the source per account.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,

    /// Scraper executable (e.g. `node`).
    #[serde(default = "default_browser_command")]
    pub browser_command: String,

    /// Arguments placed before the handle and count (e.g. the script path).
    #[serde(default = "default_browser_args")]
    pub browser_args: Vec<String>,

    /// Scraper timeout in seconds.
    #[serde(default = "default_browser_timeout")]
    pub browser_timeout_seconds: u64,

    /// RapidAPI key.
    #[serde(default)]
    pub rapidapi_key: Option<String>,

    /// RapidAPI host header value.
    #[serde(default = "default_rapidapi_host")]
    pub rapidapi_host: String,

    /// RapidAPI base URL.
    #[serde(default = "default_rapidapi_base_url")]
    pub rapidapi_base_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            max_candidates: default_max_candidates(),
            browser_command: default_browser_command(),
            browser_args: default_browser_args(),
            browser_timeout_seconds: default_browser_timeout(),
            rapidapi_key: None,
            rapidapi_host: default_rapidapi_host(),
            rapidapi_base_url: default_rapidapi_base_url(),
        }
    }
}

/// Remote sync (object store + document store) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Cloud project ID.
    #[serde(default)]
    pub project_id: Option<String>,

    /// Storage bucket; defaults to `<project_id>.appspot.com`.
    #[serde(default)]
    pub storage_bucket: Option<String>,

    /// Document database name.
    #[serde(default = "default_database")]
    pub database: String,

    /// Collection receiving media metadata records.
    #[serde(default = "default_collection")]
    pub collection: String,

    /// OAuth2 bearer token used for both stores.
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default = "default_storage_base_url")]
    pub storage_base_url: String,

    #[serde(default = "default_firestore_base_url")]
    pub firestore_base_url: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            storage_bucket: None,
            database: default_database(),
            collection: default_collection(),
            access_token: None,
            storage_base_url: default_storage_base_url(),
            firestore_base_url: default_firestore_base_url(),
        }
    }
}

impl RemoteConfig {
    /// Whether enough is configured to talk to the remote stores.
    pub fn is_configured(&self) -> bool {
        self.project_id.as_deref().is_some_and(|s| !s.is_empty())
            && self.access_token.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Effective storage bucket name.
    pub fn bucket(&self) -> Option<String> {
        self.storage_bucket
            .clone()
            .or_else(|| self.project_id.as_ref().map(|p| format!("{}.appspot.com", p)))
    }
}

fn default_min_resolution() -> u32 {
    800
}

fn default_limit() -> usize {
    10
}

fn default_concurrency() -> usize {
    4
}

fn default_fetch_timeout() -> u64 {
    15
}

fn default_max_body_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_account_delay() -> u64 {
    2000
}

fn default_true() -> bool {
    true
}

fn default_max_candidates() -> usize {
    25
}

fn default_browser_command() -> String {
    "node".to_string()
}

fn default_browser_args() -> Vec<String> {
    vec!["scraper/instagram_scraper.js".to_string()]
}

fn default_browser_timeout() -> u64 {
    60
}

fn default_rapidapi_host() -> String {
    "instagram-scraper21.p.rapidapi.com".to_string()
}

fn default_rapidapi_base_url() -> String {
    "https://instagram-scraper21.p.rapidapi.com/api/v1".to_string()
}

fn default_database() -> String {
    "(default)".to_string()
}

fn default_collection() -> String {
    "instagram_media".to_string()
}

fn default_storage_base_url() -> String {
    "https://firebasestorage.googleapis.com".to_string()
}

fn default_firestore_base_url() -> String {
    "https://firestore.googleapis.com".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}. Create one from config.example.toml",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the effective download directory.
    pub fn download_directory(&self) -> PathBuf {
        self.options
            .download_directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("output/downloads"))
    }
}
