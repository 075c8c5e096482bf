//! Content hashing for deduplication.

use md5::{Digest, Md5};

/// Compute the MD5 hex digest of in-memory bytes.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
