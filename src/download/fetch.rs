//! Bounded single-attempt image fetching.

use std::time::Duration;

use futures::StreamExt;
use reqwest::{header, Client};

use crate::config::Config;
use crate::error::{Error, Result};

/// Browser-like user agent sent with image requests.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// HTTP image fetcher with a timeout and a body-size cap.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: Client,
    max_body_bytes: u64,
}

impl ImageFetcher {
    /// Create a fetcher with explicit limits.
    pub fn new(timeout: Duration, max_body_bytes: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Fetch(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_body_bytes,
        })
    }

    /// Create a fetcher from configured options.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.options.fetch_timeout(), config.options.max_body_bytes)
    }

    /// GET `url` once and return the body.
    ///
    /// Non-2xx statuses, transport errors and bodies larger than the cap are
    /// all reported as [`Error::Fetch`].
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "image/webp,image/apng,image/*,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| Error::Fetch(describe_transport_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!("HTTP {}", status)));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_body_bytes {
                return Err(Error::Fetch(format!(
                    "Body too large: {} bytes (limit {})",
                    length, self.max_body_bytes
                )));
            }
        }

        let capacity = response
            .content_length()
            .unwrap_or(0)
            .min(self.max_body_bytes) as usize;
        let mut body = Vec::with_capacity(capacity);
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::Fetch(format!("Stream error: {}", e)))?;
            if (body.len() + chunk.len()) as u64 > self.max_body_bytes {
                return Err(Error::Fetch(format!(
                    "Body exceeded {} bytes",
                    self.max_body_bytes
                )));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("Timed out: {}", err)
    } else if err.is_connect() {
        format!("Connection failed: {}", err)
    } else {
        format!("Request failed: {}", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher(max_body_bytes: u64) -> ImageFetcher {
        ImageFetcher::new(Duration::from_secs(2), max_body_bytes).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .mount(&server)
            .await;

        let body = fetcher(1024)
            .fetch(&format!("{}/a.jpg", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = fetcher(1024)
            .fetch(&format!("{}/a.jpg", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch(ref msg) if msg.contains("403")));
    }

    #[tokio::test]
    async fn test_fetch_body_too_large() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 4096]))
            .mount(&server)
            .await;

        let err = fetcher(1024)
            .fetch(&format!("{}/big.jpg", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(vec![1u8])
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let fetcher = ImageFetcher::new(Duration::from_millis(50), 1024).unwrap();
        let err = fetcher
            .fetch(&format!("{}/slow.jpg", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let err = fetcher(1024)
            .fetch("http://127.0.0.1:1/a.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
    }
}
