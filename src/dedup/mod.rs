//! Deduplication module.
//!
//! Provides:
//! - MD5 content hashing for items without a provider ID
//! - Stem-based duplicate tracking per account archive

pub mod hash;
pub mod service;

pub use hash::hash_bytes;
pub use service::{is_image_extension, DedupService};
