//! Per-account on-disk archive.
//!
//! Each account owns `<download_dir>/<handle>/`, holding the downloaded images
//! and `archive.jsonl`, an append-only manifest with one serialized
//! [`DownloadResult`] per line.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dedup::is_image_extension;
use crate::download::DownloadResult;
use crate::error::Result;
use crate::fs::{account_folder_in, ensure_dir};

/// Manifest filename inside each account directory.
pub const MANIFEST_FILE: &str = "archive.jsonl";

/// An account's local archive.
#[derive(Debug)]
pub struct AccountArchive {
    pub account_handle: String,
    pub local_directory: PathBuf,
    pub items: Vec<DownloadResult>,
}

impl AccountArchive {
    /// Open (creating if needed) the archive for `handle` under `download_dir`.
    pub fn open(download_dir: &Path, handle: &str) -> Result<Self> {
        let local_directory = account_folder_in(download_dir, handle)?;
        ensure_dir(&local_directory)?;
        let items = read_manifest(&local_directory.join(MANIFEST_FILE))?;

        Ok(Self {
            account_handle: handle.to_string(),
            local_directory,
            items,
        })
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.local_directory.join(MANIFEST_FILE)
    }

    /// Append results to the manifest. Existing lines are never rewritten.
    pub fn append(&mut self, results: &[DownloadResult]) -> Result<()> {
        if results.is_empty() {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.manifest_path())?;

        let mut buffer = String::new();
        for result in results {
            buffer.push_str(&serde_json::to_string(result)?);
            buffer.push('\n');
        }
        file.write_all(buffer.as_bytes())?;
        file.flush()?;

        self.items.extend_from_slice(results);
        Ok(())
    }

    /// Downloaded items, oldest first.
    pub fn downloaded(&self) -> impl Iterator<Item = &DownloadResult> {
        self.items.iter().filter(|r| r.is_downloaded())
    }
}

fn read_manifest(path: &Path) -> Result<Vec<DownloadResult>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(fs::File::open(path)?);
    let mut items = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<DownloadResult>(&line) {
            Ok(item) => items.push(item),
            Err(e) => tracing::warn!(
                "Skipping malformed line {} in {}: {}",
                index + 1,
                path.display(),
                e
            ),
        }
    }

    Ok(items)
}

/// Summary of one account directory.
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub account_handle: String,
    pub image_count: u64,
    pub total_bytes: u64,
    pub last_updated: Option<DateTime<Utc>>,
    pub manifest_entries: usize,
}

/// Summarize every account directory under `download_dir`, sorted by handle.
pub fn summarize_accounts(download_dir: &Path) -> Result<Vec<AccountSummary>> {
    if !download_dir.exists() {
        return Ok(Vec::new());
    }

    let mut summaries = Vec::new();
    for entry in fs::read_dir(download_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(handle) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };
        summaries.push(summarize_directory(&path, handle)?);
    }

    summaries.sort_by(|a, b| a.account_handle.cmp(&b.account_handle));
    Ok(summaries)
}

fn summarize_directory(dir: &Path, account_handle: String) -> Result<AccountSummary> {
    let mut summary = AccountSummary {
        account_handle,
        image_count: 0,
        total_bytes: 0,
        last_updated: None,
        manifest_entries: 0,
    };

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }

        let modified = metadata.modified().ok().map(DateTime::<Utc>::from);
        if modified > summary.last_updated {
            summary.last_updated = modified;
        }

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if is_image_extension(extension) {
            summary.image_count += 1;
            summary.total_bytes += metadata.len();
        }
    }

    summary.manifest_entries = read_manifest(&dir.join(MANIFEST_FILE))?.len();
    Ok(summary)
}
