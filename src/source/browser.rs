//! Headless-browser scraper source.
//!
//! Runs an external scraper process as `<command> <args...> <handle> <count>`
//! and reads the JSON object it prints to stdout. The scraper may print log
//! lines around that object.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use url::Url;

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::media::MediaCandidate;
use crate::source::types::{unix_to_utc, BrowserOutput, BrowserPost, StringOrNumber};
use crate::source::CandidateSource;

/// Candidate source backed by an external browser scraper.
pub struct BrowserScraperSource {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl BrowserScraperSource {
    pub fn new(command: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(source: &SourceConfig) -> Self {
        Self::new(
            source.browser_command.clone(),
            source.browser_args.clone(),
            Duration::from_secs(source.browser_timeout_seconds),
        )
    }

    async fn run_scraper(&self, handle: &str, count: usize) -> Result<(bool, String, String)> {
        let mut command = Command::new(&self.command);
        command
            .args(&self.args)
            .arg(handle)
            .arg(count.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(
            "Running scraper: {} {} {} {}",
            self.command,
            self.args.join(" "),
            handle,
            count
        );

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                Error::SourceUnavailable(format!(
                    "Scraper timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                Error::SourceUnavailable(format!("Failed to start '{}': {}", self.command, e))
            })?;

        Ok((
            output.status.success(),
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ))
    }
}

#[async_trait]
impl CandidateSource for BrowserScraperSource {
    fn name(&self) -> &str {
        "browser"
    }

    async fn fetch_candidates(&self, handle: &str, limit: usize) -> Result<Vec<MediaCandidate>> {
        let (success, stdout, stderr) = self.run_scraper(handle, limit).await?;

        let parsed = extract_json_object(&stdout)
            .map(serde_json::from_value::<BrowserOutput>)
            .transpose()
            .map_err(|e| Error::SourceUnavailable(format!("Malformed scraper output: {}", e)))?;

        if let Some(error) = parsed.as_ref().and_then(|p| p.error.as_deref()) {
            if error == "not_found" {
                return Err(Error::AccountNotFound(handle.to_string()));
            }
        }

        if !success {
            return Err(Error::SourceUnavailable(format!(
                "Scraper exited with an error: {}",
                tail(&stderr, 500)
            )));
        }

        let output = parsed.ok_or_else(|| {
            Error::SourceUnavailable(format!(
                "No JSON object in scraper output: {}",
                tail(&stdout, 500)
            ))
        })?;

        if let Some(error) = output.error.as_deref() {
            return Err(Error::SourceUnavailable(format!(
                "Scraper reported '{}': {}",
                error,
                output.message.as_deref().unwrap_or("")
            )));
        }

        let candidates: Vec<MediaCandidate> = output
            .posts
            .iter()
            .filter_map(post_to_candidate)
            .take(limit)
            .collect();

        tracing::debug!("Scraper returned {} candidates for @{}", candidates.len(), handle);
        Ok(candidates)
    }
}

fn post_to_candidate(post: &BrowserPost) -> Option<MediaCandidate> {
    let url = upgrade_cdn_url(post.image_url()?);
    let dim = |v: &Option<StringOrNumber>| v.as_ref().and_then(StringOrNumber::as_u32).unwrap_or(0);

    let mut candidate = MediaCandidate::new(url, dim(&post.width), dim(&post.height))
        .with_caption(post.description.clone().unwrap_or_default());
    if let Some(id) = post.identifier() {
        candidate = candidate.with_source_id(id);
    }
    if let Some(ts) = post
        .taken_at
        .as_ref()
        .and_then(|t| t.as_i64())
        .and_then(unix_to_utc)
    {
        candidate = candidate.with_posted_at(ts);
    }
    Some(candidate)
}

/// Find the first balanced `{...}` in `text` that parses as JSON.
pub fn extract_json_object(text: &str) -> Option<serde_json::Value> {
    let bytes = text.as_bytes();
    let mut start = 0;

    while let Some(offset) = text[start..].find('{') {
        let open = start + offset;
        if let Some(close) = matching_brace(bytes, open) {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(&text[open..=close]) {
                if value.is_object() {
                    return Some(value);
                }
            }
        }
        start = open + 1;
    }
    None
}

/// Index of the brace closing the one at `open`, skipping string contents.
fn matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Rewrite an Instagram CDN URL to request the high-quality variant.
///
/// Only the `stp` query parameter changes (`e15` becomes `e35`, or `_e35` is
/// appended to `dst-jpg`). Other URLs are returned unchanged.
pub fn upgrade_cdn_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };
    let is_cdn = url
        .host_str()
        .is_some_and(|h| h.contains("cdninstagram.com") || h.starts_with("scontent"));
    if !is_cdn {
        return raw.to_string();
    }

    let mut changed = false;
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            if k == "stp" {
                let upgraded = if v.contains("e15") {
                    v.replace("e15", "e35")
                } else if !v.contains("e35") {
                    v.replace("dst-jpg", "dst-jpg_e35")
                } else {
                    v.to_string()
                };
                changed |= upgraded != v;
                (k.into_owned(), upgraded)
            } else {
                (k.into_owned(), v.into_owned())
            }
        })
        .collect();

    if !changed {
        return raw.to_string();
    }
    url.query_pairs_mut().clear().extend_pairs(pairs);
    url.to_string()
}

fn tail(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    let count = trimmed.chars().count();
    if count <= max_chars {
        return trimmed.to_string();
    }
    trimmed.chars().skip(count - max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_with_log_lines() {
        let stdout = "Launching browser...\n{not json}\nFound 2 posts {\n  \"posts\": [{\"id\": \"a\", \"description\": \"curly } brace\"}]\n}\nDone.";
        let value = extract_json_object(stdout).unwrap();
        assert_eq!(value["posts"][0]["id"], "a");
        assert_eq!(value["posts"][0]["description"], "curly } brace");
    }

    #[test]
    fn test_extract_json_none() {
        assert!(extract_json_object("no json here").is_none());
        assert!(extract_json_object("{ unterminated").is_none());
    }

    #[test]
    fn test_upgrade_cdn_url() {
        let url = "https://scontent-lhr8-1.cdninstagram.com/v/t51/abc.jpg?stp=dst-jpg_e15_s640x640&_nc_ht=x";
        let upgraded = upgrade_cdn_url(url);
        assert!(upgraded.contains("stp=dst-jpg_e35_s640x640"));
        assert!(upgraded.contains("_nc_ht=x"));

        let plain = "https://scontent.cdninstagram.com/v/a.jpg?stp=dst-jpg_s640x640";
        assert!(upgrade_cdn_url(plain).contains("stp=dst-jpg_e35_s640x640"));

        let other = "https://example.com/a.jpg?stp=dst-jpg_e15";
        assert_eq!(upgrade_cdn_url(other), other);
        assert_eq!(upgrade_cdn_url("not a url"), "not a url");
    }

    #[test]
    fn test_post_to_candidate() {
        let post = BrowserPost {
            id: Some("C1".to_string()),
            shortcode: Some("C1".to_string()),
            display_url: Some("https://example.com/a.jpg".to_string()),
            thumbnail_src: Some("https://example.com/t.jpg".to_string()),
            description: Some("Photo by natgeo".to_string()),
            ..Default::default()
        };
        let candidate = post_to_candidate(&post).unwrap();
        assert_eq!(candidate.source_url, "https://example.com/a.jpg");
        assert_eq!(candidate.source_id.as_deref(), Some("C1"));
        assert!(candidate.has_unknown_dimensions());

        assert!(post_to_candidate(&BrowserPost::default()).is_none());
    }

    #[cfg(unix)]
    fn script_source(script: &str) -> BrowserScraperSource {
        BrowserScraperSource::new(
            "sh",
            vec!["-c".to_string(), script.to_string(), "scraper".to_string()],
            Duration::from_secs(5),
        )
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_from_process() {
        // $1 is the handle, $2 the count
        let source = script_source(
            r#"echo "scraping $1 ($2)"; echo '{"posts":[{"id":"a","display_url":"https://example.com/a.jpg","width":1080,"height":1080},{"id":"b","display_url":"https://example.com/b.jpg"}]}'"#,
        );
        let candidates = source.fetch_candidates("natgeo", 1).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].reported_width, 1080);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_not_found() {
        let source = script_source(r#"echo '{"error":"not_found"}'; exit 1"#);
        let err = source.fetch_candidates("ghost", 5).await.unwrap_err();
        assert!(matches!(err, Error::AccountNotFound(ref h) if h == "ghost"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failure_modes() {
        let err = script_source("echo boom >&2; exit 3")
            .fetch_candidates("natgeo", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable(_)));

        let err = script_source("echo 'no json'")
            .fetch_candidates("natgeo", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable(_)));

        let slow = BrowserScraperSource::new(
            "sh",
            vec!["-c".to_string(), "sleep 5".to_string()],
            Duration::from_millis(100),
        );
        let err = slow.fetch_candidates("natgeo", 5).await.unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable(_)));

        let missing = BrowserScraperSource::new("/nonexistent/scraper", vec![], Duration::from_secs(1));
        assert!(missing.fetch_candidates("natgeo", 5).await.is_err());
    }
}
