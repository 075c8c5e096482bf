//! Run reports and account lists.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::normalize_handle;
use crate::download::{GlobalState, ResultRecord};
use crate::error::{Error, Result};
use crate::pipeline::AccountReport;

/// One account entry in an accounts file.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountEntry {
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Load handles from a JSON array of `{ "username": ... }` objects.
///
/// Entries without a usable username are skipped. `start_from` entries are
/// dropped first, then at most `max_accounts` are kept.
pub fn load_accounts_file(
    path: &Path,
    start_from: usize,
    max_accounts: Option<usize>,
) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    let entries: Vec<AccountEntry> = serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!(
            "Failed to parse accounts file {}: {}",
            path.display(),
            e
        ))
    })?;

    let handles = entries
        .into_iter()
        .skip(start_from)
        .filter_map(|entry| match normalize_handle(&entry.username) {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!("Skipping account entry '{}': {}", entry.username, e);
                None
            }
        })
        .take(max_accounts.unwrap_or(usize::MAX))
        .collect();

    Ok(handles)
}

/// Report section for a successfully processed account.
#[derive(Debug, Serialize)]
pub struct AccountSection {
    pub account: String,
    pub directory: String,
    pub downloaded: u64,
    pub results: Vec<ResultRecord>,
}

/// Report section for an account whose source failed.
#[derive(Debug, Serialize)]
pub struct FailureSection {
    pub account: String,
    pub error: String,
}

#[derive(Debug, Default, Serialize)]
pub struct ReportStats {
    pub accounts_processed: u64,
    pub accounts_failed: u64,
    pub downloaded: u64,
    pub skipped_low_resolution: u64,
    pub skipped_duplicate: u64,
    pub fetch_errors: u64,
    pub synced: u64,
    pub bytes_written: u64,
}

/// Whole-run JSON report written by `--report`.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub stats: ReportStats,
    pub accounts: Vec<AccountSection>,
    pub failures: Vec<FailureSection>,
}

impl RunReport {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            generated_at: Utc::now(),
            source: source.into(),
            stats: ReportStats::default(),
            accounts: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn add_account(&mut self, report: &AccountReport) {
        self.accounts.push(AccountSection {
            account: report.account_handle.clone(),
            directory: report.local_directory.display().to_string(),
            downloaded: report.stats.downloaded_count,
            results: report.results.iter().map(|r| r.to_record()).collect(),
        });
    }

    pub fn add_failure(&mut self, account: &str, error: &Error) {
        self.failures.push(FailureSection {
            account: account.to_string(),
            error: error.to_string(),
        });
    }

    /// Copy the final global counters into the report.
    pub fn finish(&mut self, global: &GlobalState) {
        self.stats = ReportStats {
            accounts_processed: global.accounts_processed,
            accounts_failed: global.accounts_failed,
            downloaded: global.downloaded_count,
            skipped_low_resolution: global.low_resolution_count,
            skipped_duplicate: global.duplicate_count,
            fetch_errors: global.error_count,
            synced: global.synced_count,
            bytes_written: global.bytes_written,
        };
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
