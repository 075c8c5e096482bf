//! Per-account fetch pipeline.
//!
//! `source -> resolution filter -> batch download (+ sync) -> manifest append`.

use std::path::PathBuf;

use crate::archive::AccountArchive;
use crate::config::Config;
use crate::download::{BatchDownloader, DownloadResult, DownloadState, FetchRequest};
use crate::error::Result;
use crate::media::filter_candidates;
use crate::remote::RemoteSync;
use crate::source::{build_source, CandidateSource};

/// Everything produced by one account's fetch.
#[derive(Debug)]
pub struct AccountReport {
    pub account_handle: String,
    pub local_directory: PathBuf,
    pub results: Vec<DownloadResult>,
    pub stats: DownloadState,
}

/// Runs fetch requests against a candidate source and an archive root.
pub struct Pipeline {
    source: Box<dyn CandidateSource>,
    downloader: BatchDownloader,
    download_dir: PathBuf,
    max_candidates: usize,
}

impl Pipeline {
    pub fn new(
        source: Box<dyn CandidateSource>,
        downloader: BatchDownloader,
        download_dir: PathBuf,
        max_candidates: usize,
    ) -> Self {
        Self {
            source,
            downloader,
            download_dir,
            max_candidates,
        }
    }

    /// Build the pipeline described by a validated configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let source = build_source(config)?;
        let mut downloader = BatchDownloader::from_config(config)?;
        if config.options.upload_to_remote {
            downloader = downloader.with_remote(RemoteSync::from_config(config)?);
        }

        Ok(Self::new(
            source,
            downloader,
            config.download_directory(),
            config.source.max_candidates,
        ))
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Fetch one account.
    ///
    /// Only candidate-source failures are returned as errors; per-image
    /// problems are recorded as outcomes in the report.
    pub async fn fetch_account(&self, request: &FetchRequest) -> Result<AccountReport> {
        let handle = request.account_handle();
        // Ask for extra candidates so skips do not starve the limit
        let wanted = self.max_candidates.max(request.limit());

        let candidates = self.source.fetch_candidates(handle, wanted).await?;
        let kept = filter_candidates(&candidates, request.min_resolution());
        tracing::info!(
            "@{}: {} candidates from {}, {} pass the {}px filter",
            handle,
            candidates.len(),
            self.source.name(),
            kept.len(),
            request.min_resolution()
        );

        let mut stats = DownloadState::new(handle);
        stats.record_candidates(candidates.len(), kept.len());

        let mut archive = AccountArchive::open(&self.download_dir, handle)?;
        let results = self
            .downloader
            .run(request, kept, &archive.local_directory)
            .await?;

        archive.append(&results)?;
        stats.record_all(&results);

        Ok(AccountReport {
            account_handle: handle.to_string(),
            local_directory: archive.local_directory,
            results,
            stats,
        })
    }
}
