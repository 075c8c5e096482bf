//! Best-effort push of downloaded images to the remote stores.

use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::download::DownloadResult;
use crate::error::{Error, Result};
use crate::remote::{BlobStore, FirebaseStorage, FirestoreStore, MediaRecord, MetadataStore};

/// Pushes downloaded results to a blob store and a metadata store.
///
/// Failures never change a result's outcome; they only add a `sync:` note to
/// its `error_detail`.
#[derive(Clone)]
pub struct RemoteSync {
    blob: Arc<dyn BlobStore>,
    metadata: Arc<dyn MetadataStore>,
    collection: String,
}

impl RemoteSync {
    pub fn new(
        blob: Arc<dyn BlobStore>,
        metadata: Arc<dyn MetadataStore>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            blob,
            metadata,
            collection: collection.into(),
        }
    }

    /// Build the Firebase-backed sync from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let remote = &config.remote;
        Ok(Self::new(
            Arc::new(FirebaseStorage::from_config(remote)?),
            Arc::new(FirestoreStore::from_config(remote)?),
            remote.collection.clone(),
        ))
    }

    /// Sync one result. Anything other than a committed download is returned
    /// unchanged.
    pub async fn sync(&self, account_handle: &str, mut result: DownloadResult) -> DownloadResult {
        if !result.is_downloaded() {
            return result;
        }
        let Some(path) = result.local_path.clone() else {
            return result;
        };

        match self.upload(account_handle, &path).await {
            Ok(url) => {
                tracing::debug!("Uploaded {} -> {}", path.display(), url);
                result.remote_url = Some(url);
            }
            Err(e) => {
                tracing::warn!("Upload failed for {}: {}", path.display(), e);
                result.append_error(format!("sync: upload failed: {}", e));
                return result;
            }
        }

        let record = MediaRecord::from_result(account_handle, &result, self.blob.name());
        match self.metadata.put_record(&self.collection, &record).await {
            Ok(id) => tracing::debug!("Saved metadata document {}", id),
            Err(e) => {
                tracing::warn!("Metadata write failed for {}: {}", path.display(), e);
                result.append_error(format!("sync: metadata failed: {}", e));
            }
        }

        result
    }

    async fn upload(&self, account_handle: &str, path: &Path) -> Result<String> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::InvalidFilename(path.display().to_string()))?;
        let bytes = tokio::fs::read(path).await?;
        let content_type = mime_guess::from_path(path).first_or_octet_stream();
        let key = format!("{}/{}", account_handle, filename);

        self.blob.put(&key, bytes, content_type.essence_str()).await
    }
}
