//! insta-fetch - fetch high-resolution images from public Instagram accounts
//!
//! This library discovers image candidates for an account, filters them by
//! resolution, downloads them into a per-account archive and optionally syncs
//! each image to a remote object store and document database.
//!
//! # Features
//!
//! - Headless-browser scraper and RapidAPI candidate sources, with fallback
//! - Max-dimension resolution filter, re-checked against the decoded image
//! - Concurrent downloads that stop after a number of successes
//! - Idempotent archives: files already on disk are reported as duplicates
//! - Best-effort Firebase Storage / Firestore sync
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use insta_fetch::{Config, FetchRequest, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("config.toml"))?;
//!     let pipeline = Pipeline::from_config(&config)?;
//!
//!     let request = FetchRequest::from_config(&config, "natgeo")?;
//!     let report = pipeline.fetch_account(&request).await?;
//!     for result in &report.results {
//!         println!("{} {}", result.outcome, result.candidate.source_url);
//!     }
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod download;
pub mod error;
pub mod fs;
pub mod media;
pub mod output;
pub mod pipeline;
pub mod remote;
pub mod report;
pub mod source;

// Re-exports for convenience
pub use archive::AccountArchive;
pub use config::{Config, SourceKind};
pub use download::{
    BatchDownloader, DownloadResult, DownloadState, FetchRequest, GlobalState, Outcome,
};
pub use error::{Error, Result};
pub use media::{filter_candidates, MediaCandidate};
pub use pipeline::{AccountReport, Pipeline};
pub use remote::{BlobStore, MetadataStore, RemoteSync};
pub use source::CandidateSource;
