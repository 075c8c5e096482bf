//! Concurrent batch downloading with a success limit.
//!
//! Fetches run through an order-preserving buffered stream. Everything that
//! touches the account directory (dimension re-check, stem claims, writes) is
//! done by the single consumer loop, in candidate order, so the outcome of a
//! batch does not depend on which fetch finishes first.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::dedup::{hash_bytes, DedupService};
use crate::download::fetch::ImageFetcher;
use crate::download::request::FetchRequest;
use crate::download::result::DownloadResult;
use crate::error::Result;
use crate::fs::{ensure_dir, media_filename, media_stem};
use crate::media::{meets_resolution, probe_image, MediaCandidate};
use crate::output::create_item_bar;
use crate::remote::RemoteSync;

/// Downloads filtered candidates into an account directory.
pub struct BatchDownloader {
    fetcher: ImageFetcher,
    concurrency: usize,
    batch_timeout: Option<Duration>,
    remote: Option<RemoteSync>,
    show_downloads: bool,
    show_skipped: bool,
}

impl BatchDownloader {
    pub fn new(fetcher: ImageFetcher, concurrency: usize) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.max(1),
            batch_timeout: None,
            remote: None,
            show_downloads: false,
            show_skipped: false,
        }
    }

    /// Build a downloader from configured options. Remote sync is attached
    /// separately with [`BatchDownloader::with_remote`].
    pub fn from_config(config: &Config) -> Result<Self> {
        let options = &config.options;
        let mut downloader = Self::new(ImageFetcher::from_config(config)?, options.concurrency);
        downloader.batch_timeout = options.batch_timeout();
        downloader.show_downloads = options.show_downloads;
        downloader.show_skipped = options.show_skipped_downloads;
        Ok(downloader)
    }

    pub fn with_remote(mut self, remote: RemoteSync) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn with_batch_timeout(mut self, timeout: Duration) -> Self {
        self.batch_timeout = Some(timeout);
        self
    }

    /// Download candidates until `request.limit()` succeed or candidates run out.
    ///
    /// Results are in candidate order. Candidates never attempted, or still
    /// in flight when the limit is hit or the batch deadline passes, have no
    /// result.
    pub async fn run(
        &self,
        request: &FetchRequest,
        candidates: Vec<MediaCandidate>,
        account_dir: &Path,
    ) -> Result<Vec<DownloadResult>> {
        ensure_dir(account_dir)?;
        let mut dedup = DedupService::from_directory(account_dir)?;

        let limit = request.limit();
        let handle = request.account_handle().to_string();
        let successes = Arc::new(AtomicUsize::new(0));
        let deadline = self
            .batch_timeout
            .map(|timeout| tokio::time::Instant::now() + timeout);

        tracing::debug!(
            "Batch for @{}: {} candidates, limit {}, concurrency {}",
            handle,
            candidates.len(),
            limit,
            self.concurrency
        );

        let fetches = stream::iter(candidates)
            .map(|candidate| {
                let fetcher = self.fetcher.clone();
                let successes = Arc::clone(&successes);
                async move {
                    if successes.load(Ordering::SeqCst) >= limit {
                        return (candidate, None);
                    }
                    let body = fetcher.fetch(&candidate.source_url).await;
                    (candidate, Some(body))
                }
            })
            .buffered(self.concurrency);
        let mut fetches = Box::pin(fetches);

        // Tracks successes against the limit
        let progress = self
            .show_downloads
            .then(|| create_item_bar(limit as u64, &format!("@{}", handle)));

        let mut results: Vec<DownloadResult> = Vec::new();
        let mut sync_tasks: Vec<(usize, JoinHandle<DownloadResult>)> = Vec::new();

        while successes.load(Ordering::SeqCst) < limit {
            let next = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, fetches.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        tracing::warn!(
                            "Batch timeout for @{}: returning {} completed results",
                            handle,
                            results.len()
                        );
                        break;
                    }
                },
                None => fetches.next().await,
            };

            let Some((candidate, fetched)) = next else {
                break;
            };
            // Not admitted: the limit was reached before this fetch started
            let Some(fetched) = fetched else {
                continue;
            };

            let result = self
                .commit(request, candidate, fetched, account_dir, &mut dedup)
                .await;
            self.log_result(&result);

            if result.is_downloaded() {
                successes.fetch_add(1, Ordering::SeqCst);
                if let Some(progress) = &progress {
                    progress.inc(1);
                }
                if let Some(task) = self.spawn_sync(request, &result) {
                    sync_tasks.push((results.len(), task));
                }
            }

            results.push(result);
        }

        // Abandon anything still in flight
        drop(fetches);
        tracing::debug!(
            "Batch for @{} done: {} results, {} duplicates, {} stems indexed",
            handle,
            results.len(),
            dedup.duplicates_found(),
            dedup.tracked_count()
        );
        if let Some(progress) = progress {
            progress.finish_and_clear();
        }

        for (index, task) in sync_tasks {
            match task.await {
                Ok(synced) => results[index] = synced,
                Err(e) => results[index].append_error(format!("sync: task failed: {}", e)),
            }
        }

        Ok(results)
    }

    /// Turn one fetched body into an outcome, writing the file if it qualifies.
    async fn commit(
        &self,
        request: &FetchRequest,
        candidate: MediaCandidate,
        fetched: Result<Vec<u8>>,
        account_dir: &Path,
        dedup: &mut DedupService,
    ) -> DownloadResult {
        let bytes = match fetched {
            Ok(bytes) => bytes,
            Err(e) => return DownloadResult::fetch_error(candidate, e.to_string()),
        };

        let info = match probe_image(&bytes) {
            Ok(info) => info,
            Err(e) => return DownloadResult::fetch_error(candidate, e.to_string()),
        };

        // Reported dimensions are untrusted; judge the decoded image
        if !meets_resolution(info.width, info.height, request.min_resolution()) {
            return DownloadResult::low_resolution(candidate, info.width, info.height);
        }

        let content_hash = hash_bytes(&bytes);
        let stem = match media_stem(
            request.account_handle(),
            candidate.source_id.as_deref(),
            &content_hash,
        ) {
            Ok(stem) => stem,
            Err(e) => return DownloadResult::fetch_error(candidate, e.to_string()),
        };

        if dedup.is_stem_seen(&stem) {
            dedup.record_duplicate();
            return DownloadResult::duplicate(candidate, info.width, info.height);
        }

        // Claimed only once the file exists
        let path = account_dir.join(media_filename(&stem, info.extension()));
        match write_file(&path, &bytes).await {
            Ok(()) => {
                dedup.claim_stem(stem);
                DownloadResult::downloaded(
                    candidate,
                    path,
                    info.width,
                    info.height,
                    bytes.len() as u64,
                )
            }
            Err(e) => DownloadResult::fetch_error(candidate, format!("Write failed: {}", e)),
        }
    }

    fn spawn_sync(
        &self,
        request: &FetchRequest,
        result: &DownloadResult,
    ) -> Option<JoinHandle<DownloadResult>> {
        if !request.upload_to_remote() {
            return None;
        }
        let remote = self.remote.clone()?;
        let handle = request.account_handle().to_string();
        let result = result.clone();
        Some(tokio::spawn(async move { remote.sync(&handle, result).await }))
    }

    fn log_result(&self, result: &DownloadResult) {
        let url = &result.candidate.source_url;
        if result.is_downloaded() {
            if self.show_downloads {
                tracing::info!(
                    "Downloaded: {}",
                    result.filename().unwrap_or(url.as_str())
                );
            }
        } else if self.show_skipped {
            match &result.error_detail {
                Some(detail) => tracing::info!("{}: {} ({})", result.outcome, url, detail),
                None => tracing::info!("{}: {}", result.outcome, url),
            }
        } else {
            tracing::debug!("{}: {}", result.outcome, url);
        }
    }
}

/// Write to a temporary sibling, then rename into place.
async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("download");
    let temp = path.with_file_name(format!(".{}.{}.part", name, uuid::Uuid::new_v4()));

    tokio::fs::write(&temp, bytes).await?;
    if let Err(e) = tokio::fs::rename(&temp, path).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(e.into());
    }
    Ok(())
}
