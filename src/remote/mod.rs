//! Remote sync of downloaded images.
//!
//! This module provides:
//! - `BlobStore` and `MetadataStore` traits for the two remote backends
//! - Firebase Storage / Firestore REST implementations
//! - `RemoteSync`, which pushes one downloaded result to both stores

pub mod firebase;
pub mod record;
pub mod sync;

use async_trait::async_trait;

use crate::error::Result;

pub use firebase::{FirebaseStorage, FirestoreStore};
pub use record::MediaRecord;
pub use sync::RemoteSync;

/// Object store for image bytes.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Backend name, recorded as `upload_method`.
    fn name(&self) -> &str;

    /// Store `bytes` under `key` and return a URL that serves them.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String>;
}

/// Document store for per-image metadata.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    fn name(&self) -> &str;

    /// Write `record` into `collection` and return the new document ID.
    async fn put_record(&self, collection: &str, record: &MediaRecord) -> Result<String>;
}
