//! Download module for fetching candidate images.
//!
//! This module provides:
//! - Fetch request construction
//! - Bounded single-image fetching
//! - Concurrent batch downloading with a success limit
//! - Per-item results and download statistics

pub mod batch;
pub mod fetch;
pub mod request;
pub mod result;
pub mod state;

pub use batch::BatchDownloader;
pub use fetch::ImageFetcher;
pub use request::FetchRequest;
pub use result::{DownloadResult, Outcome, ResultRecord};
pub use state::{DownloadState, GlobalState};
