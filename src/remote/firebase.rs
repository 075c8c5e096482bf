//! Firebase Storage and Firestore REST backends.

use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::config::RemoteConfig;
use crate::error::{Error, Result};
use crate::remote::{BlobStore, MediaRecord, MetadataStore};

fn build_client() -> Result<Client> {
    Client::builder()
        .build()
        .map_err(|e| Error::Store(format!("Failed to create HTTP client: {}", e)))
}

fn required(value: Option<&str>, name: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.to_string()),
        _ => Err(Error::MissingConfig(format!("remote.{}", name))),
    }
}

/// Percent-encode a value for use as a single URL path segment.
fn encode_segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

async fn check_status(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Store(format!(
        "{} failed: HTTP {}{}",
        what,
        status,
        if body.is_empty() {
            String::new()
        } else {
            format!(" - {}", body)
        }
    )))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorageObject {
    name: String,
    #[serde(default)]
    download_tokens: Option<String>,
}

/// Firebase Storage upload via the REST media endpoint.
pub struct FirebaseStorage {
    client: Client,
    base_url: String,
    bucket: String,
    access_token: String,
}

impl FirebaseStorage {
    pub fn new(
        base_url: impl Into<String>,
        bucket: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            access_token: access_token.into(),
        })
    }

    pub fn from_config(remote: &RemoteConfig) -> Result<Self> {
        let bucket = required(remote.bucket().as_deref(), "storage_bucket")?;
        let token = required(remote.access_token.as_deref(), "access_token")?;
        Self::new(&remote.storage_base_url, bucket, token)
    }

    /// Public download URL for an uploaded object.
    fn download_url(&self, object: &StorageObject) -> String {
        let mut url = format!(
            "{}/v0/b/{}/o/{}?alt=media",
            self.base_url,
            self.bucket,
            encode_segment(&object.name)
        );
        // Several comma-separated tokens may be issued; any one works.
        if let Some(token) = object
            .download_tokens
            .as_deref()
            .and_then(|t| t.split(',').next())
            .filter(|t| !t.is_empty())
        {
            url.push_str("&token=");
            url.push_str(token);
        }
        url
    }
}

#[async_trait]
impl BlobStore for FirebaseStorage {
    fn name(&self) -> &str {
        "firebase_storage"
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let url = format!("{}/v0/b/{}/o", self.base_url, self.bucket);
        tracing::debug!("Uploading {} ({} bytes) to {}", key, bytes.len(), url);

        let response = self
            .client
            .post(&url)
            .query(&[("uploadType", "media"), ("name", key)])
            .bearer_auth(&self.access_token)
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| Error::Store(format!("Upload request failed: {}", e)))?;

        let response = check_status(response, "Upload").await?;
        let text = response
            .text()
            .await
            .map_err(|e| Error::Store(format!("Upload response unreadable: {}", e)))?;

        let object: StorageObject = serde_json::from_str(&text).map_err(|e| {
            Error::Store(format!(
                "Failed to parse upload response: {} - Response: {}",
                e, text
            ))
        })?;

        Ok(self.download_url(&object))
    }
}

/// Firestore document writes via the REST API.
pub struct FirestoreStore {
    client: Client,
    base_url: String,
    project_id: String,
    database: String,
    access_token: String,
}

impl FirestoreStore {
    pub fn new(
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        database: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            database: database.into(),
            access_token: access_token.into(),
        })
    }

    pub fn from_config(remote: &RemoteConfig) -> Result<Self> {
        let project_id = required(remote.project_id.as_deref(), "project_id")?;
        let token = required(remote.access_token.as_deref(), "access_token")?;
        Self::new(
            &remote.firestore_base_url,
            project_id,
            &remote.database,
            token,
        )
    }
}

#[async_trait]
impl MetadataStore for FirestoreStore {
    fn name(&self) -> &str {
        "firestore"
    }

    async fn put_record(&self, collection: &str, record: &MediaRecord) -> Result<String> {
        let document_id = uuid::Uuid::new_v4().to_string();
        let url = format!(
            "{}/v1/projects/{}/databases/{}/documents/{}",
            self.base_url, self.project_id, self.database, collection
        );

        let body = json!({ "fields": encode_fields(&serde_json::to_value(record)?) });
        tracing::debug!("Writing document {} to {}", document_id, url);

        let response = self
            .client
            .post(&url)
            .query(&[("documentId", document_id.as_str())])
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Store(format!("Document write failed: {}", e)))?;

        let response = check_status(response, "Document write").await?;
        let written: Value = response
            .json()
            .await
            .map_err(|e| Error::Store(format!("Failed to parse document response: {}", e)))?;

        // `name` is the full resource path; the ID is its last segment.
        let id = written
            .get("name")
            .and_then(Value::as_str)
            .and_then(|name| name.rsplit('/').next())
            .map(str::to_string)
            .unwrap_or(document_id);

        Ok(id)
    }
}

/// Encode a JSON object as Firestore `fields`.
pub fn encode_fields(value: &Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| (k.clone(), encode_value(v)))
            .collect(),
        _ => Map::new(),
    }
}

/// Encode one JSON value in Firestore's typed representation.
///
/// RFC 3339 strings become `timestampValue`.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            // Firestore transmits int64 as a decimal string
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => {
            if chrono::DateTime::parse_from_rfc3339(s).is_ok() {
                json!({ "timestampValue": s })
            } else {
                json!({ "stringValue": s })
            }
        }
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(_) => json!({ "mapValue": { "fields": encode_fields(value) } }),
    }
}
