//! Filename generation and manipulation.

use std::path::Path;

use crate::dedup::hash_bytes;
use crate::error::{Error, Result};

/// Marker between handle and content hash in hash-named files.
const HASH_MARKER: &str = "_hash_";

/// Validate and sanitize a filename by removing or replacing invalid characters.
///
/// Returns an error if the filename contains path traversal patterns.
pub fn sanitize_filename(name: &str) -> Result<String> {
    // Reject path traversal attempts
    if name.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    // Also reject if it contains path separators (should be sanitized, not allowed)
    if name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidFilename(format!(
            "Path separators not allowed in filename: '{}'",
            name
        )));
    }

    // Reject null bytes
    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed in filename: '{}'",
            name
        )));
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Filename cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}

/// Sanitize a path component (folder or identifier) with less strict validation.
///
/// Separators and reserved characters are replaced rather than rejected, so
/// provider IDs like `123_4/5` still yield a usable name.
pub fn sanitize_path_component(name: &str) -> Result<String> {
    // Reject path traversal attempts
    if name.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    // Reject null bytes
    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed: '{}'",
            name
        )));
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Path component cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}

/// Build the stem (name without extension) for a downloaded item.
///
/// `<handle>_<source_id>` when the provider supplied an ID, otherwise
/// `<handle>_hash_<content_hash>`. An ID that sanitizing had to change gets
/// the first 8 hex digits of its MD5 appended, so `a/b` and `a_b` stay apart.
pub fn media_stem(handle: &str, source_id: Option<&str>, content_hash: &str) -> Result<String> {
    let stem = match source_id {
        Some(id) => {
            let clean = sanitize_path_component(id)?;
            if clean == id {
                format!("{}_{}", handle, clean)
            } else {
                format!("{}_{}_{}", handle, clean, &hash_bytes(id.as_bytes())[..8])
            }
        }
        None => format!("{}{}{}", handle, HASH_MARKER, content_hash),
    };
    sanitize_filename(&stem)
}

/// Build the full filename for a downloaded item.
pub fn media_filename(stem: &str, extension: &str) -> String {
    format!("{}.{}", stem, extension)
}

/// Filename without its extension.
pub fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}
