//! RapidAPI Instagram scraper source.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::media::MediaCandidate;
use crate::source::types::RapidApiResponse;
use crate::source::CandidateSource;

const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Candidate source backed by a RapidAPI `user-posts` endpoint.
pub struct RapidApiSource {
    client: Client,
    base_url: String,
    api_key: String,
    api_host: String,
}

impl RapidApiSource {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        api_host: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::SourceUnavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_host: api_host.into(),
        })
    }

    /// Build from configuration. Fails when no API key is configured.
    pub fn from_config(source: &SourceConfig) -> Result<Self> {
        let key = source
            .rapidapi_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::MissingConfig("source.rapidapi_key (or RAPIDAPI_KEY)".into()))?;
        Self::new(&source.rapidapi_base_url, key, &source.rapidapi_host)
    }
}

#[async_trait]
impl CandidateSource for RapidApiSource {
    fn name(&self) -> &str {
        "rapidapi"
    }

    async fn fetch_candidates(&self, handle: &str, limit: usize) -> Result<Vec<MediaCandidate>> {
        let url = format!("{}/user-posts", self.base_url);
        tracing::debug!("GET {}?username={}", url, handle);

        let response = self
            .client
            .get(&url)
            .query(&[("username", handle)])
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.api_host)
            .send()
            .await
            .map_err(|e| Error::SourceUnavailable(format!("Request failed: {}", e)))?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if status == StatusCode::NOT_FOUND {
            return Err(Error::AccountNotFound(handle.to_string()));
        }
        if !status.is_success() {
            let reason = match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "API key rejected",
                StatusCode::TOO_MANY_REQUESTS => "rate limited",
                _ => "provider error",
            };
            return Err(Error::SourceUnavailable(format!(
                "HTTP {} ({})",
                status, reason
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| Error::SourceUnavailable(format!("Failed to read response: {}", e)))?;

        let body: RapidApiResponse = serde_json::from_str(&text).map_err(|e| {
            Error::SourceUnavailable(format!(
                "Failed to parse posts: {} - Response: {}",
                e,
                text.chars().take(300).collect::<String>()
            ))
        })?;

        if body.data.is_none() && body.posts.is_none() {
            if let Some(message) = &body.message {
                tracing::warn!("Provider message for @{}: {}", handle, message);
            }
        }

        let candidates: Vec<MediaCandidate> = body
            .into_posts()
            .into_iter()
            .flat_map(|post| post.into_candidates())
            .take(limit)
            .collect();

        tracing::debug!("RapidAPI returned {} candidates for @{}", candidates.len(), handle);
        Ok(candidates)
    }
}
