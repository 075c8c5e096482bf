//! Provider response type definitions.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::media::MediaCandidate;

/// A value some providers send as a string and others as a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl StringOrNumber {
    pub fn as_string(&self) -> String {
        match self {
            StringOrNumber::String(s) => s.clone(),
            StringOrNumber::Number(n) => n.to_string(),
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            StringOrNumber::String(s) => s.trim().parse().ok(),
            StringOrNumber::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            StringOrNumber::String(s) => s.trim().parse().ok(),
            StringOrNumber::Number(n) => n.as_i64(),
        }
    }
}

/// Caption as either plain text or `{ "text": ... }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Caption {
    Text(String),
    Object {
        #[serde(default)]
        text: Option<String>,
    },
}

impl Caption {
    pub fn text(&self) -> &str {
        match self {
            Caption::Text(s) => s,
            Caption::Object { text } => text.as_deref().unwrap_or(""),
        }
    }
}

/// Nested `dimensions` object.
#[derive(Debug, Clone, Deserialize)]
pub struct Dimensions {
    #[serde(default)]
    pub width: Option<StringOrNumber>,
    #[serde(default)]
    pub height: Option<StringOrNumber>,
}

/// RapidAPI `user-posts` response body.
#[derive(Debug, Deserialize)]
pub struct RapidApiResponse {
    #[serde(default)]
    pub data: Option<Vec<RapidApiPost>>,
    #[serde(default)]
    pub posts: Option<Vec<RapidApiPost>>,
    #[serde(default)]
    pub message: Option<String>,
}

impl RapidApiResponse {
    pub fn into_posts(self) -> Vec<RapidApiPost> {
        self.data.or(self.posts).unwrap_or_default()
    }
}

/// One post (or carousel child) from RapidAPI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RapidApiPost {
    #[serde(default)]
    pub id: Option<StringOrNumber>,
    #[serde(default, alias = "code")]
    pub shortcode: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub display_url: Option<String>,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,

    #[serde(default)]
    pub width: Option<StringOrNumber>,
    #[serde(default)]
    pub height: Option<StringOrNumber>,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,

    #[serde(default)]
    pub caption: Option<Caption>,
    /// ISO 8601 publish time.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Unix publish time.
    #[serde(default)]
    pub taken_at: Option<StringOrNumber>,

    #[serde(default, alias = "children")]
    pub carousel_media: Vec<RapidApiPost>,
}

impl RapidApiPost {
    /// First non-empty image URL field.
    pub fn image_url(&self) -> Option<&str> {
        [
            &self.image_url,
            &self.image,
            &self.display_url,
            &self.media_url,
            &self.thumbnail,
        ]
        .into_iter()
        .filter_map(|u| u.as_deref())
        .find(|u| !u.trim().is_empty())
    }

    /// Reported `(width, height)`, `0` when unknown.
    pub fn dimensions(&self) -> (u32, u32) {
        let flat = |v: &Option<StringOrNumber>| v.as_ref().and_then(StringOrNumber::as_u32);
        let nested = self.dimensions.as_ref();

        let width = flat(&self.width)
            .or_else(|| nested.and_then(|d| flat(&d.width)))
            .unwrap_or(0);
        let height = flat(&self.height)
            .or_else(|| nested.and_then(|d| flat(&d.height)))
            .unwrap_or(0);
        (width, height)
    }

    pub fn identifier(&self) -> Option<String> {
        self.shortcode
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| self.id.as_ref().map(StringOrNumber::as_string))
    }

    pub fn posted_at(&self) -> Option<DateTime<Utc>> {
        if let Some(ts) = self.timestamp.as_deref() {
            if let Some(parsed) = parse_timestamp(ts) {
                return Some(parsed);
            }
        }
        self.taken_at
            .as_ref()
            .and_then(StringOrNumber::as_i64)
            .and_then(unix_to_utc)
    }

    /// Expand into candidates. Carousel children inherit caption and
    /// publish time and get `<parent>_<n>` IDs when they have none.
    pub fn into_candidates(self) -> Vec<MediaCandidate> {
        let caption = self
            .caption
            .as_ref()
            .map(|c| c.text().to_string())
            .unwrap_or_default();
        let posted_at = self.posted_at();
        let parent_id = self.identifier();

        let decorate = |candidate: MediaCandidate, id: Option<String>| {
            let mut candidate = candidate.with_caption(caption.clone());
            if let Some(id) = id {
                candidate = candidate.with_source_id(id);
            }
            if let Some(ts) = posted_at {
                candidate = candidate.with_posted_at(ts);
            }
            candidate
        };

        if self.carousel_media.is_empty() {
            return self
                .image_url()
                .map(|url| {
                    let (w, h) = self.dimensions();
                    vec![decorate(MediaCandidate::new(url, w, h), parent_id.clone())]
                })
                .unwrap_or_default();
        }

        self.carousel_media
            .iter()
            .enumerate()
            .filter_map(|(index, child)| {
                let url = child.image_url()?;
                let (w, h) = child.dimensions();
                let id = child.identifier().or_else(|| {
                    parent_id
                        .as_ref()
                        .map(|parent| format!("{}_{}", parent, index + 1))
                });
                Some(decorate(MediaCandidate::new(url, w, h), id))
            })
            .collect()
    }
}

/// JSON object printed by the browser scraper.
#[derive(Debug, Default, Deserialize)]
pub struct BrowserOutput {
    #[serde(default)]
    pub posts: Vec<BrowserPost>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One post scraped from a profile grid.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrowserPost {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub shortcode: Option<String>,
    #[serde(default)]
    pub display_url: Option<String>,
    #[serde(default)]
    pub thumbnail_src: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub width: Option<StringOrNumber>,
    #[serde(default)]
    pub height: Option<StringOrNumber>,
    #[serde(default)]
    pub taken_at: Option<StringOrNumber>,
}

impl BrowserPost {
    pub fn image_url(&self) -> Option<&str> {
        [&self.display_url, &self.thumbnail_src]
            .into_iter()
            .filter_map(|u| u.as_deref())
            .find(|u| !u.trim().is_empty())
    }

    /// Shortcode, falling back to `id`. The scraper uses `unknown` when it
    /// could not read either.
    pub fn identifier(&self) -> Option<&str> {
        [&self.shortcode, &self.id]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .find(|v| !v.is_empty() && *v != "unknown")
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    // Naive ISO 8601 without an offset is taken as UTC
    chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

pub(crate) fn unix_to_utc(seconds: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(seconds, 0).single()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_field_fallbacks() {
        let post: RapidApiPost = serde_json::from_str(
            r#"{"id": 123, "media_url": "https://cdn/a.jpg",
                "dimensions": {"width": 1080, "height": "1350"},
                "caption": {"text": "hello"}, "taken_at": 1700000000}"#,
        )
        .unwrap();

        assert_eq!(post.image_url(), Some("https://cdn/a.jpg"));
        assert_eq!(post.dimensions(), (1080, 1350));
        assert_eq!(post.identifier().as_deref(), Some("123"));

        let candidates = post.into_candidates();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].caption, "hello");
        assert_eq!(candidates[0].source_id.as_deref(), Some("123"));
        assert_eq!(candidates[0].posted_at.map(|t| t.timestamp()), Some(1_700_000_000));
    }

    #[test]
    fn test_carousel_expansion() {
        let post: RapidApiPost = serde_json::from_str(
            r#"{"shortcode": "Cx", "caption": "trip", "timestamp": "2024-05-01T10:00:00",
                "carousel_media": [
                    {"display_url": "https://cdn/1.jpg", "width": 1440, "height": 1800},
                    {"id": "child2", "image": "https://cdn/2.jpg"},
                    {"width": 10}
                ]}"#,
        )
        .unwrap();

        let candidates = post.into_candidates();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].source_id.as_deref(), Some("Cx_1"));
        assert_eq!(candidates[0].reported_width, 1440);
        assert_eq!(candidates[1].source_id.as_deref(), Some("child2"));
        assert_eq!(candidates[1].caption, "trip");
        assert!(candidates[1].posted_at.is_some());
    }

    #[test]
    fn test_post_without_url_is_dropped() {
        let post: RapidApiPost = serde_json::from_str(r#"{"id": "x", "image": ""}"#).unwrap();
        assert!(post.into_candidates().is_empty());
    }

    #[test]
    fn test_response_prefers_data() {
        let response: RapidApiResponse =
            serde_json::from_str(r#"{"posts": [{"image": "b"}]}"#).unwrap();
        assert_eq!(response.into_posts().len(), 1);

        let response: RapidApiResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(response.into_posts().is_empty());
    }

    #[test]
    fn test_browser_post_identifier() {
        let post = BrowserPost {
            id: Some("unknown".to_string()),
            shortcode: Some("unknown".to_string()),
            ..Default::default()
        };
        assert_eq!(post.identifier(), None);

        let post = BrowserPost {
            id: Some("C9".to_string()),
            ..Default::default()
        };
        assert_eq!(post.identifier(), Some("C9"));
    }
}
