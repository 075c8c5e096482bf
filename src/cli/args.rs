//! Command-line argument definitions using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{Config, SourceKind};

/// Instagram high-resolution image fetcher CLI.
#[derive(Parser, Debug)]
#[command(
    name = "insta-fetch",
    version,
    about = "Download high-resolution images from public Instagram accounts",
    long_about = "A CLI tool to fetch recent images from public Instagram accounts.\n\n\
                  Candidates come from a headless-browser scraper or a RapidAPI endpoint, are \
                  filtered by resolution, downloaded into per-account archives and optionally \
                  synced to Firebase Storage and Firestore."
)]
pub struct Args {
    /// Account handle(s) to fetch.
    /// Can specify multiple handles separated by spaces.
    #[arg(short, long, value_delimiter = ' ', num_args = 1..)]
    pub user: Option<Vec<String>>,

    /// JSON file with a list of `{ "username": ... }` entries.
    #[arg(long = "accounts-file")]
    pub accounts_file: Option<PathBuf>,

    /// Skip this many entries of the accounts file.
    #[arg(long = "start-from", default_value_t = 0)]
    pub start_from: usize,

    /// Process at most this many entries of the accounts file.
    #[arg(long = "max-accounts")]
    pub max_accounts: Option<usize>,

    /// Base directory for downloads.
    #[arg(short = 'd', long = "directory")]
    pub download_directory: Option<PathBuf>,

    /// Minimum resolution in pixels (either side).
    #[arg(short = 'r', long = "min-resolution")]
    pub min_resolution: Option<u32>,

    /// Number of images to download per account.
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Candidate source.
    #[arg(long, value_enum)]
    pub source: Option<SourceKindArg>,

    /// RapidAPI key.
    #[arg(long = "api-key", env = "RAPIDAPI_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Sync downloads to Firebase Storage and Firestore.
    #[arg(long)]
    pub upload: bool,

    /// Firebase project ID.
    #[arg(long = "firebase-project", env = "FIREBASE_PROJECT_ID")]
    pub firebase_project: Option<String>,

    /// Firebase Storage bucket (defaults to `<project>.appspot.com`).
    #[arg(long = "firebase-bucket", env = "FIREBASE_STORAGE_BUCKET")]
    pub firebase_bucket: Option<String>,

    /// OAuth2 access token for Firebase.
    #[arg(long = "firebase-token", env = "FIREBASE_ACCESS_TOKEN", hide_env_values = true)]
    pub firebase_token: Option<String>,

    /// Maximum concurrent image downloads.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Per-image timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Overall per-account download deadline in seconds.
    #[arg(long = "batch-timeout")]
    pub batch_timeout: Option<u64>,

    /// Write a JSON report of every result to this file.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// List archived accounts and exit.
    #[arg(long)]
    pub list: bool,

    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Hide download progress information.
    #[arg(long, short)]
    pub quiet: bool,

    /// Show information about skipped images.
    #[arg(long)]
    pub show_skipped: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

/// CLI candidate source argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SourceKindArg {
    /// Headless-browser scraper.
    Browser,
    /// RapidAPI endpoint.
    #[value(alias = "api")]
    Rapidapi,
    /// Browser first, RapidAPI when the browser is unavailable.
    Auto,
}

impl From<SourceKindArg> for SourceKind {
    fn from(arg: SourceKindArg) -> Self {
        match arg {
            SourceKindArg::Browser => SourceKind::Browser,
            SourceKindArg::Rapidapi => SourceKind::RapidApi,
            SourceKindArg::Auto => SourceKind::Auto,
        }
    }
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    ///
    /// The accounts file is not read here; see `report::load_accounts_file`.
    pub fn merge_into_config(&self, config: &mut Config) {
        // Override handles if provided
        if let Some(users) = &self.user {
            config.targets.handles = users.clone();
        }

        if let Some(dir) = &self.download_directory {
            config.options.download_directory = Some(dir.clone());
        }

        if let Some(min_resolution) = self.min_resolution {
            config.options.min_resolution = min_resolution;
        }

        if let Some(limit) = self.limit {
            config.options.limit = limit;
        }

        if let Some(concurrency) = self.concurrency {
            config.options.concurrency = concurrency;
        }

        if let Some(timeout) = self.timeout {
            config.options.fetch_timeout_seconds = timeout;
        }

        if let Some(batch_timeout) = self.batch_timeout {
            config.options.batch_timeout_seconds = Some(batch_timeout);
        }

        // Source settings
        if let Some(source) = self.source {
            config.source.kind = source.into();
        }

        if let Some(key) = &self.api_key {
            config.source.rapidapi_key = Some(key.clone());
        }

        // Remote settings
        if let Some(project) = &self.firebase_project {
            config.remote.project_id = Some(project.clone());
        }

        if let Some(bucket) = &self.firebase_bucket {
            config.remote.storage_bucket = Some(bucket.clone());
        }

        if let Some(token) = &self.firebase_token {
            config.remote.access_token = Some(token.clone());
        }

        // Boolean flags (only override if set to non-default)
        if self.upload {
            config.options.upload_to_remote = true;
        }

        if self.quiet {
            config.options.show_downloads = false;
            config.options.show_skipped_downloads = false;
        }

        if self.show_skipped {
            config.options.show_skipped_downloads = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overrides() {
        let args = Args::parse_from([
            "insta-fetch",
            "-u",
            "natgeo nasa",
            "--min-resolution",
            "1080",
            "--limit",
            "3",
            "--source",
            "api",
            "--api-key",
            "k",
            "--upload",
            "--quiet",
        ]);

        let mut config = Config::default();
        args.merge_into_config(&mut config);

        assert_eq!(config.targets.handles, vec!["natgeo", "nasa"]);
        assert_eq!(config.options.min_resolution, 1080);
        assert_eq!(config.options.limit, 3);
        assert_eq!(config.source.kind, SourceKind::RapidApi);
        assert_eq!(config.source.rapidapi_key.as_deref(), Some("k"));
        assert!(config.options.upload_to_remote);
        assert!(!config.options.show_downloads);
    }

    #[test]
    fn test_merge_keeps_config_values() {
        let args = Args::parse_from(["insta-fetch"]);

        let mut config = Config::default();
        config.targets.handles = vec!["natgeo".to_string()];
        config.options.limit = 7;
        let before_key = config.source.rapidapi_key.clone();
        args.merge_into_config(&mut config);

        assert_eq!(config.targets.handles, vec!["natgeo"]);
        assert_eq!(config.options.limit, 7);
        // Environment may supply a key; without one nothing changes
        if args.api_key.is_none() {
            assert_eq!(config.source.rapidapi_key, before_key);
        }
    }
}
