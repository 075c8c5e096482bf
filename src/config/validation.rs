//! Configuration validation logic.

use std::sync::OnceLock;

use crate::config::loader::Config;
use crate::config::modes::SourceKind;
use crate::error::{Error, Result};
use regex::Regex;

/// Maximum handle length accepted by Instagram.
const MAX_HANDLE_LENGTH: usize = 30;

/// Upper bound on concurrent fetches.
const MAX_CONCURRENCY: usize = 32;

fn handle_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Handle pattern: letters, digits, periods, underscores
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9._]+$").expect("valid handle regex"))
}

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_handles(&config.targets.handles)?;
    validate_options(config)?;
    validate_source(config)?;

    if config.options.upload_to_remote {
        validate_remote(config)?;
    }

    Ok(())
}

/// Validate and normalize a single account handle.
///
/// A leading `@` is stripped; the result is returned lowercase-preserved.
pub fn normalize_handle(handle: &str) -> Result<String> {
    let clean = handle.trim().trim_start_matches('@');

    if clean.is_empty() {
        return Err(Error::ConfigValidation {
            field: "handles".to_string(),
            message: "Account handle cannot be empty".to_string(),
        });
    }

    if clean.len() > MAX_HANDLE_LENGTH {
        return Err(Error::ConfigValidation {
            field: "handles".to_string(),
            message: format!(
                "Handle '{}' is too long (maximum {} characters)",
                handle, MAX_HANDLE_LENGTH
            ),
        });
    }

    if !handle_pattern().is_match(clean) || clean.contains("..") {
        return Err(Error::ConfigValidation {
            field: "handles".to_string(),
            message: format!(
                "Handle '{}' contains invalid characters. Only letters, digits, periods, and underscores allowed.",
                handle
            ),
        });
    }

    // Check for placeholder values
    let lower = clean.to_lowercase();
    if lower == "replaceme" || lower == "username" {
        return Err(Error::ConfigValidation {
            field: "handles".to_string(),
            message: format!(
                "Handle '{}' appears to be a placeholder. Please provide actual account handles.",
                handle
            ),
        });
    }

    Ok(clean.to_string())
}

/// Validate account handles.
pub fn validate_handles<S: AsRef<str>, I: IntoIterator<Item = S>>(handles: I) -> Result<()> {
    let handles: Vec<_> = handles.into_iter().collect();

    if handles.is_empty() {
        return Err(Error::MissingConfig(
            "handles (at least one account handle required)".to_string(),
        ));
    }

    for handle in handles {
        normalize_handle(handle.as_ref())?;
    }

    Ok(())
}

/// Validate numeric download options.
pub fn validate_options(config: &Config) -> Result<()> {
    let options = &config.options;

    if options.min_resolution == 0 {
        return Err(Error::ConfigValidation {
            field: "min_resolution".to_string(),
            message: "Minimum resolution must be greater than 0".to_string(),
        });
    }

    if options.limit == 0 {
        return Err(Error::ConfigValidation {
            field: "limit".to_string(),
            message: "Limit must be greater than 0".to_string(),
        });
    }

    if options.concurrency == 0 || options.concurrency > MAX_CONCURRENCY {
        return Err(Error::ConfigValidation {
            field: "concurrency".to_string(),
            message: format!(
                "Concurrency must be between 1 and {} (got {})",
                MAX_CONCURRENCY, options.concurrency
            ),
        });
    }

    if options.max_body_bytes == 0 {
        return Err(Error::ConfigValidation {
            field: "max_body_bytes".to_string(),
            message: "Maximum body size must be greater than 0".to_string(),
        });
    }

    Ok(())
}

/// Validate that the selected candidate source has what it needs.
pub fn validate_source(config: &Config) -> Result<()> {
    let source = &config.source;

    let needs_browser = matches!(source.kind, SourceKind::Browser | SourceKind::Auto);
    if needs_browser && source.browser_command.trim().is_empty() {
        return Err(Error::MissingConfig("browser_command".to_string()));
    }

    if source.kind == SourceKind::RapidApi {
        let key = source.rapidapi_key.as_deref().unwrap_or("");
        if key.is_empty() {
            return Err(Error::MissingConfig(
                "rapidapi_key (set RAPIDAPI_KEY or pass --api-key)".to_string(),
            ));
        }
        if key.to_lowercase().contains("your_rapidapi_key") {
            return Err(Error::ConfigValidation {
                field: "rapidapi_key".to_string(),
                message: "API key appears to be a placeholder.".to_string(),
            });
        }
    }

    if source.max_candidates == 0 {
        return Err(Error::ConfigValidation {
            field: "max_candidates".to_string(),
            message: "Candidate count must be greater than 0".to_string(),
        });
    }

    Ok(())
}

/// Validate remote sync settings.
pub fn validate_remote(config: &Config) -> Result<()> {
    let remote = &config.remote;

    if remote.project_id.as_deref().unwrap_or("").is_empty() {
        return Err(Error::MissingConfig(
            "project_id (set FIREBASE_PROJECT_ID)".to_string(),
        ));
    }

    if remote.access_token.as_deref().unwrap_or("").is_empty() {
        return Err(Error::MissingConfig(
            "access_token (set FIREBASE_ACCESS_TOKEN)".to_string(),
        ));
    }

    if remote.collection.trim().is_empty() || remote.collection.contains('/') {
        return Err(Error::ConfigValidation {
            field: "collection".to_string(),
            message: format!("Invalid collection name: '{}'", remote.collection),
        });
    }

    Ok(())
}
