//! Media candidate representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An image reference discovered for an account, before download.
///
/// Dimensions are whatever the provider reported; `0` means unknown. They are
/// untrusted and re-checked against the decoded file after download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaCandidate {
    /// Image URL.
    pub source_url: String,

    /// Width reported by the provider.
    pub reported_width: u32,

    /// Height reported by the provider.
    pub reported_height: u32,

    /// Post caption.
    #[serde(default)]
    pub caption: String,

    /// When the post was published, if the provider exposes it.
    #[serde(default)]
    pub posted_at: Option<DateTime<Utc>>,

    /// Provider's post identifier (shortcode, carousel-suffixed ID, ...).
    #[serde(default)]
    pub source_id: Option<String>,
}

impl MediaCandidate {
    /// Create a candidate with only a URL and reported dimensions.
    pub fn new(source_url: impl Into<String>, reported_width: u32, reported_height: u32) -> Self {
        Self {
            source_url: source_url.into(),
            reported_width,
            reported_height,
            caption: String::new(),
            posted_at: None,
            source_id: None,
        }
    }

    /// Builder-style setter for the provider identifier.
    pub fn with_source_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.source_id = if id.trim().is_empty() { None } else { Some(id) };
        self
    }

    /// Builder-style setter for the caption.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    /// Builder-style setter for the publish time.
    pub fn with_posted_at(mut self, posted_at: DateTime<Utc>) -> Self {
        self.posted_at = Some(posted_at);
        self
    }

    /// Whether the provider gave no dimensions at all.
    pub fn has_unknown_dimensions(&self) -> bool {
        self.reported_width == 0 && self.reported_height == 0
    }

    /// Caption shortened for log output.
    pub fn short_caption(&self, max_chars: usize) -> String {
        if self.caption.chars().count() <= max_chars {
            return self.caption.clone();
        }
        let truncated: String = self.caption.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
