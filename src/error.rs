//! Error types for the insta-fetch application.

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // Candidate source errors
    #[error("Candidate source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    // Per-item download errors
    #[error("Fetch failed: {0}")]
    Fetch(String),

    // Remote sync errors
    #[error("Store error: {0}")]
    Store(String),

    // File system errors
    #[error("Invalid filename (path traversal attempt): {0}")]
    InvalidFilename(String),

    // Media errors
    #[error("Invalid media: {0}")]
    Media(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    /// Whether this error aborts a whole account operation.
    pub fn is_source_failure(&self) -> bool {
        matches!(self, Error::SourceUnavailable(_) | Error::AccountNotFound(_))
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const ABORT: i32 = 1;
    pub const SOURCE_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const DOWNLOAD_ERROR: i32 = 4;
    pub const UNEXPECTED_ERROR: i32 = 5;
    pub const SOME_ACCOUNTS_FAILED: i32 = 6;
}
