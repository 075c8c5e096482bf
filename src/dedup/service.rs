//! Per-account deduplication index.
//!
//! Tracks which filename stems already exist in an account archive, both on
//! disk (scanned once) and claimed during the current batch.

use std::collections::HashSet;
use std::path::Path;

use crate::error::Result;
use crate::fs::naming::file_stem;
use crate::media::is_archived_extension;

/// Deduplication service keyed by filename stem.
#[derive(Debug, Default)]
pub struct DedupService {
    // Stems of files already in the archive or claimed this batch
    stems: HashSet<String>,

    // Statistics
    duplicates_found: u64,
}

impl DedupService {
    /// Create a new deduplication service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a service pre-populated from an account directory.
    pub fn from_directory(dir: &Path) -> Result<Self> {
        let mut service = Self::new();
        service.scan_directory(dir)?;
        Ok(service)
    }

    /// Scan a directory for existing image files and index their stems.
    pub fn scan_directory(&mut self, dir: &Path) -> Result<()> {
        if !dir.exists() {
            return Ok(());
        }

        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            self.index_file(&path);
        }

        tracing::debug!(
            "Indexed {} existing files in {}",
            self.stems.len(),
            dir.display()
        );

        Ok(())
    }

    /// Index a single image file by stem.
    fn index_file(&mut self, path: &Path) {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !is_image_extension(extension) {
            return;
        }

        let Some(stem) = file_stem(path) else {
            return;
        };

        self.stems.insert(stem);
    }

    /// Check if a stem is already taken.
    pub fn is_stem_seen(&self, stem: &str) -> bool {
        self.stems.contains(stem)
    }

    /// Claim a stem. Returns `false` if it was already taken.
    pub fn claim_stem(&mut self, stem: String) -> bool {
        self.stems.insert(stem)
    }

    /// Record a duplicate was found.
    pub fn record_duplicate(&mut self) {
        self.duplicates_found += 1;
    }

    /// Get the number of duplicates found.
    pub fn duplicates_found(&self) -> u64 {
        self.duplicates_found
    }

    /// Get total tracked stems.
    pub fn tracked_count(&self) -> usize {
        self.stems.len()
    }
}

/// Whether a file extension denotes an image we archive.
pub fn is_image_extension(ext: &str) -> bool {
    is_archived_extension(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_image_extension() {
        assert!(is_image_extension("jpg"));
        assert!(is_image_extension("JPEG"));
        assert!(is_image_extension("webp"));
        assert!(!is_image_extension("jsonl"));
        assert!(!is_image_extension(""));
    }

    #[test]
    fn test_claim_stem() {
        let mut service = DedupService::new();

        assert!(!service.is_stem_seen("natgeo_a"));
        assert!(service.claim_stem("natgeo_a".to_string()));
        assert!(service.is_stem_seen("natgeo_a"));
        assert!(!service.claim_stem("natgeo_a".to_string()));
    }

    #[test]
    fn test_scan_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("natgeo_abc.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("natgeo_hash_beef.png"), b"x").unwrap();
        std::fs::write(dir.path().join("archive.jsonl"), b"{}").unwrap();
        std::fs::create_dir(dir.path().join("natgeo_sub.jpg")).unwrap();

        let service = DedupService::from_directory(dir.path()).unwrap();

        assert_eq!(service.tracked_count(), 2);
        assert!(service.is_stem_seen("natgeo_abc"));
        assert!(service.is_stem_seen("natgeo_hash_beef"));
        assert!(!service.is_stem_seen("archive"));
    }

    #[test]
    fn test_scan_missing_directory() {
        let service = DedupService::from_directory(Path::new("/nonexistent/dir")).unwrap();
        assert_eq!(service.tracked_count(), 0);
    }

    #[test]
    fn test_duplicate_counting() {
        let mut service = DedupService::new();

        assert_eq!(service.duplicates_found(), 0);
        service.record_duplicate();
        service.record_duplicate();
        assert_eq!(service.duplicates_found(), 2);
    }
}
