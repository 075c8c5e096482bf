//! Metadata record pushed to the document store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::download::{DownloadResult, Outcome};

/// Flat metadata for one synced image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub source_id: String,
    pub account_handle: String,
    pub source_url: String,
    pub caption: String,
    pub posted_at: Option<DateTime<Utc>>,
    pub outcome: Outcome,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub remote_url: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub upload_method: String,
}

impl MediaRecord {
    /// Build a record from a result. A missing provider ID is replaced by a
    /// fresh UUID.
    pub fn from_result(account_handle: &str, result: &DownloadResult, upload_method: &str) -> Self {
        let candidate = &result.candidate;
        Self {
            source_id: candidate
                .source_id
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            account_handle: account_handle.to_string(),
            source_url: candidate.source_url.clone(),
            caption: candidate.caption.clone(),
            posted_at: candidate.posted_at,
            outcome: result.outcome,
            width: result.actual_width,
            height: result.actual_height,
            remote_url: result.remote_url.clone(),
            uploaded_at: Utc::now(),
            upload_method: upload_method.to_string(),
        }
    }
}
