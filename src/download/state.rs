//! Download statistics tracking.

use crate::download::result::{DownloadResult, Outcome};

/// Per-account download statistics.
#[derive(Debug, Default, Clone)]
pub struct DownloadState {
    pub account_handle: String,

    // Source stage
    pub candidates_found: u64,
    pub candidates_kept: u64,

    // Outcomes
    pub downloaded_count: u64,
    pub low_resolution_count: u64,
    pub duplicate_count: u64,
    pub error_count: u64,

    // Remote sync
    pub synced_count: u64,
    pub sync_failed_count: u64,

    pub bytes_written: u64,
}

impl DownloadState {
    /// Create empty statistics for an account.
    pub fn new(account_handle: impl Into<String>) -> Self {
        Self {
            account_handle: account_handle.into(),
            ..Default::default()
        }
    }

    /// Record what the source returned and what survived filtering.
    pub fn record_candidates(&mut self, found: usize, kept: usize) {
        self.candidates_found += found as u64;
        self.candidates_kept += kept as u64;
    }

    /// Count one result.
    pub fn record(&mut self, result: &DownloadResult) {
        match result.outcome {
            Outcome::Downloaded => {
                self.downloaded_count += 1;
                self.bytes_written += result.bytes.unwrap_or(0);
            }
            Outcome::SkippedLowResolution => self.low_resolution_count += 1,
            Outcome::SkippedDuplicate => self.duplicate_count += 1,
            Outcome::FetchError => self.error_count += 1,
        }

        if result.remote_url.is_some() {
            self.synced_count += 1;
        }
        if result
            .error_detail
            .as_deref()
            .is_some_and(|e| e.contains("sync:"))
        {
            self.sync_failed_count += 1;
        }
    }

    /// Count every result in a batch.
    pub fn record_all(&mut self, results: &[DownloadResult]) {
        for result in results {
            self.record(result);
        }
    }

    /// Results that did not produce a file.
    pub fn skipped_count(&self) -> u64 {
        self.low_resolution_count + self.duplicate_count + self.error_count
    }
}

/// Global statistics across all accounts.
#[derive(Debug, Default)]
pub struct GlobalState {
    pub downloaded_count: u64,
    pub low_resolution_count: u64,
    pub duplicate_count: u64,
    pub error_count: u64,
    pub synced_count: u64,
    pub bytes_written: u64,
    pub accounts_processed: u64,
    pub accounts_failed: u64,
}

impl GlobalState {
    /// Add statistics from an account's download state.
    pub fn add_account_stats(&mut self, state: &DownloadState) {
        self.downloaded_count += state.downloaded_count;
        self.low_resolution_count += state.low_resolution_count;
        self.duplicate_count += state.duplicate_count;
        self.error_count += state.error_count;
        self.synced_count += state.synced_count;
        self.bytes_written += state.bytes_written;
        self.accounts_processed += 1;
    }

    /// Mark an account as failed.
    pub fn mark_account_failed(&mut self) {
        self.accounts_failed += 1;
    }

    pub fn skipped_count(&self) -> u64 {
        self.low_resolution_count + self.duplicate_count + self.error_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaCandidate;
    use std::path::PathBuf;

    #[test]
    fn test_record_outcomes() {
        let c = || MediaCandidate::new("u", 0, 0);
        let mut synced = DownloadResult::downloaded(c(), PathBuf::from("/a.jpg"), 900, 900, 100);
        synced.remote_url = Some("https://r/a".into());
        let mut unsynced = DownloadResult::downloaded(c(), PathBuf::from("/b.jpg"), 900, 900, 50);
        unsynced.append_error("sync: upload failed: boom");

        let mut state = DownloadState::new("natgeo");
        state.record_candidates(6, 5);
        state.record_all(&[
            synced,
            unsynced,
            DownloadResult::low_resolution(c(), 10, 10),
            DownloadResult::duplicate(c(), 900, 900),
            DownloadResult::fetch_error(c(), "HTTP 404"),
        ]);

        assert_eq!(state.candidates_found, 6);
        assert_eq!(state.downloaded_count, 2);
        assert_eq!(state.bytes_written, 150);
        assert_eq!(state.synced_count, 1);
        assert_eq!(state.sync_failed_count, 1);
        assert_eq!(state.skipped_count(), 3);
    }

    #[test]
    fn test_global_aggregation() {
        let mut a = DownloadState::new("a");
        a.downloaded_count = 3;
        a.duplicate_count = 1;
        let mut b = DownloadState::new("b");
        b.downloaded_count = 2;
        b.error_count = 4;

        let mut global = GlobalState::default();
        global.add_account_stats(&a);
        global.add_account_stats(&b);
        global.mark_account_failed();

        assert_eq!(global.downloaded_count, 5);
        assert_eq!(global.skipped_count(), 5);
        assert_eq!(global.accounts_processed, 2);
        assert_eq!(global.accounts_failed, 1);
    }
}
