//! Candidate sources.
//!
//! This module provides:
//! - The `CandidateSource` trait
//! - A browser scraper source and a RapidAPI source
//! - A fallback combinator used by the `auto` source kind

pub mod browser;
pub mod rapidapi;
pub mod types;

use async_trait::async_trait;

use crate::config::{Config, SourceKind};
use crate::error::{Error, Result};
use crate::media::MediaCandidate;

pub use browser::BrowserScraperSource;
pub use rapidapi::RapidApiSource;

/// Something that can list image candidates for an account.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Return up to `limit` candidates for `handle`, newest first.
    ///
    /// Fails with [`Error::AccountNotFound`] or [`Error::SourceUnavailable`].
    async fn fetch_candidates(&self, handle: &str, limit: usize) -> Result<Vec<MediaCandidate>>;
}

/// Tries `primary`, then `fallback` when the primary is unavailable.
///
/// `AccountNotFound` from the primary is final.
pub struct FallbackSource {
    primary: Box<dyn CandidateSource>,
    fallback: Box<dyn CandidateSource>,
}

impl FallbackSource {
    pub fn new(primary: Box<dyn CandidateSource>, fallback: Box<dyn CandidateSource>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl CandidateSource for FallbackSource {
    fn name(&self) -> &str {
        "auto"
    }

    async fn fetch_candidates(&self, handle: &str, limit: usize) -> Result<Vec<MediaCandidate>> {
        match self.primary.fetch_candidates(handle, limit).await {
            Err(Error::SourceUnavailable(reason)) => {
                tracing::warn!(
                    "{} source unavailable ({}), falling back to {}",
                    self.primary.name(),
                    reason,
                    self.fallback.name()
                );
                self.fallback.fetch_candidates(handle, limit).await
            }
            other => other,
        }
    }
}

/// Build the configured candidate source.
pub fn build_source(config: &Config) -> Result<Box<dyn CandidateSource>> {
    let source = &config.source;
    match source.kind {
        SourceKind::Browser => Ok(Box::new(BrowserScraperSource::from_config(source))),
        SourceKind::RapidApi => Ok(Box::new(RapidApiSource::from_config(source)?)),
        SourceKind::Auto => {
            let browser = Box::new(BrowserScraperSource::from_config(source));
            match RapidApiSource::from_config(source) {
                Ok(api) => Ok(Box::new(FallbackSource::new(browser, Box::new(api)))),
                Err(_) => {
                    tracing::debug!("No RapidAPI key configured; using browser source only");
                    Ok(browser)
                }
            }
        }
    }
}
