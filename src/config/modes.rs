//! Candidate source selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which candidate source to use for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Headless-browser scraper script.
    Browser,
    /// Third-party REST scraping API.
    RapidApi,
    /// Browser first, REST API when the browser is unavailable (default).
    #[default]
    Auto,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Browser => write!(f, "browser"),
            SourceKind::RapidApi => write!(f, "rapidapi"),
            SourceKind::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "browser" => Ok(SourceKind::Browser),
            "rapidapi" | "api" => Ok(SourceKind::RapidApi),
            "auto" => Ok(SourceKind::Auto),
            _ => Err(format!("Unknown candidate source: {}", s)),
        }
    }
}
