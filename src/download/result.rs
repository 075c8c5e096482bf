//! Per-candidate download outcomes.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::media::MediaCandidate;

/// What happened to a candidate during a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Downloaded,
    SkippedLowResolution,
    SkippedDuplicate,
    FetchError,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Downloaded => write!(f, "downloaded"),
            Outcome::SkippedLowResolution => write!(f, "skipped_low_resolution"),
            Outcome::SkippedDuplicate => write!(f, "skipped_duplicate"),
            Outcome::FetchError => write!(f, "fetch_error"),
        }
    }
}

/// Result of processing one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadResult {
    pub candidate: MediaCandidate,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    /// Bytes written to disk (Downloaded only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    pub recorded_at: DateTime<Utc>,
}

impl DownloadResult {
    fn with_outcome(candidate: MediaCandidate, outcome: Outcome) -> Self {
        Self {
            candidate,
            outcome,
            local_path: None,
            actual_width: None,
            actual_height: None,
            remote_url: None,
            error_detail: None,
            bytes: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn downloaded(
        candidate: MediaCandidate,
        local_path: PathBuf,
        width: u32,
        height: u32,
        bytes: u64,
    ) -> Self {
        Self {
            local_path: Some(local_path),
            actual_width: Some(width),
            actual_height: Some(height),
            bytes: Some(bytes),
            ..Self::with_outcome(candidate, Outcome::Downloaded)
        }
    }

    pub fn low_resolution(candidate: MediaCandidate, width: u32, height: u32) -> Self {
        Self {
            actual_width: Some(width),
            actual_height: Some(height),
            ..Self::with_outcome(candidate, Outcome::SkippedLowResolution)
        }
    }

    pub fn duplicate(candidate: MediaCandidate, width: u32, height: u32) -> Self {
        Self {
            actual_width: Some(width),
            actual_height: Some(height),
            ..Self::with_outcome(candidate, Outcome::SkippedDuplicate)
        }
    }

    pub fn fetch_error(candidate: MediaCandidate, detail: impl Into<String>) -> Self {
        Self {
            error_detail: Some(detail.into()),
            ..Self::with_outcome(candidate, Outcome::FetchError)
        }
    }

    pub fn is_downloaded(&self) -> bool {
        self.outcome == Outcome::Downloaded
    }

    /// Filename component of `local_path`.
    pub fn filename(&self) -> Option<&str> {
        self.local_path
            .as_deref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
    }

    /// Append a note to `error_detail`, keeping earlier notes.
    pub fn append_error(&mut self, note: impl AsRef<str>) {
        match &mut self.error_detail {
            Some(existing) => {
                existing.push_str("; ");
                existing.push_str(note.as_ref());
            }
            None => self.error_detail = Some(note.as_ref().to_string()),
        }
    }

    /// Flat record shape consumed by external callers.
    pub fn to_record(&self) -> ResultRecord {
        ResultRecord {
            url: self.candidate.source_url.clone(),
            local_path: self
                .local_path
                .as_ref()
                .map(|p| p.display().to_string()),
            outcome: self.outcome,
            width: self.actual_width,
            height: self.actual_height,
            remote_url: self.remote_url.clone(),
            error: self.error_detail.clone(),
        }
    }
}

/// Serialized result record returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub url: String,
    pub local_path: Option<String>,
    pub outcome: Outcome,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serialization() {
        assert_eq!(
            serde_json::to_string(&Outcome::SkippedLowResolution).unwrap(),
            "\"skipped_low_resolution\""
        );
        assert_eq!(Outcome::FetchError.to_string(), "fetch_error");
    }

    #[test]
    fn test_append_error() {
        let mut result = DownloadResult::downloaded(
            MediaCandidate::new("u", 1, 1),
            PathBuf::from("/a/b.jpg"),
            1000,
            1000,
            10,
        );
        result.append_error("sync: upload failed");
        result.append_error("sync: metadata failed");
        assert_eq!(
            result.error_detail.as_deref(),
            Some("sync: upload failed; sync: metadata failed")
        );
        assert_eq!(result.filename(), Some("b.jpg"));
    }

    #[test]
    fn test_record_shape() {
        let result = DownloadResult::fetch_error(MediaCandidate::new("https://x/a.jpg", 0, 0), "HTTP 404");
        let json = serde_json::to_value(result.to_record()).unwrap();

        assert_eq!(json["url"], "https://x/a.jpg");
        assert_eq!(json["outcome"], "fetch_error");
        assert_eq!(json["error"], "HTTP 404");
        assert!(json["local_path"].is_null());
        assert!(json.get("remote_url").is_none());
    }
}
