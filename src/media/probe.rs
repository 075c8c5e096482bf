//! Image header probing.

use std::io::Cursor;

use image::{ImageFormat, ImageReader};

use crate::error::{Error, Result};

/// Format and dimensions read from an image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    extension: &'static str,
}

impl ImageInfo {
    /// File extension for the decoded format (without dot).
    pub fn extension(&self) -> &'static str {
        self.extension
    }

    /// MIME type for the decoded format.
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

/// Determine format and dimensions from in-memory bytes.
///
/// Only the header is decoded; pixel data is not materialized. Formats
/// without an archive extension are rejected.
pub fn probe_image(bytes: &[u8]) -> Result<ImageInfo> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| Error::Media(format!("Failed to read image header: {}", e)))?;

    let format = reader
        .format()
        .ok_or_else(|| Error::Media("Unrecognized image format".to_string()))?;
    let extension = archived_extension(format)
        .ok_or_else(|| Error::Media(format!("Unsupported image format: {:?}", format)))?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| Error::Media(format!("Failed to decode image header: {}", e)))?;

    Ok(ImageInfo {
        format,
        width,
        height,
        extension,
    })
}

/// Extension a format is archived under, or `None` if it is not archived.
///
/// Naming and the archive directory scan both go through this table.
pub fn archived_extension(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Jpeg => Some("jpg"),
        ImageFormat::Png => Some("png"),
        ImageFormat::Gif => Some("gif"),
        ImageFormat::WebP => Some("webp"),
        ImageFormat::Bmp => Some("bmp"),
        ImageFormat::Tiff => Some("tiff"),
        ImageFormat::Avif => Some("avif"),
        _ => None,
    }
}

/// Whether a file extension belongs to an archived image format.
pub fn is_archived_extension(ext: &str) -> bool {
    ImageFormat::from_extension(ext)
        .and_then(archived_extension)
        .is_some()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    /// Encode a blank image of the given size.
    pub(crate) fn encode_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, format).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_probe_png() {
        let info = probe_image(&encode_image(1920, 1080, ImageFormat::Png)).unwrap();
        assert_eq!((info.width, info.height), (1920, 1080));
        assert_eq!(info.extension(), "png");
        assert_eq!(info.mime_type(), "image/png");
    }

    #[test]
    fn test_probe_jpeg() {
        let info = probe_image(&encode_image(300, 200, ImageFormat::Jpeg)).unwrap();
        assert_eq!((info.width, info.height), (300, 200));
        assert_eq!(info.extension(), "jpg");
    }

    #[test]
    fn test_probe_rejects_unarchived_format() {
        let err = probe_image(&encode_image(900, 900, ImageFormat::Qoi)).unwrap_err();
        assert!(err.to_string().contains("Unsupported image format"));
    }

    #[test]
    fn test_archived_extensions_are_recognized() {
        for format in ImageFormat::all() {
            if let Some(ext) = archived_extension(format) {
                assert!(is_archived_extension(ext), "{:?} -> {}", format, ext);
            }
        }
        assert!(is_archived_extension("JPEG"));
        assert!(!is_archived_extension("qoi"));
        assert!(!is_archived_extension("jsonl"));
    }

    #[test]
    fn test_probe_garbage() {
        assert!(probe_image(b"<html>not an image</html>").is_err());
        assert!(probe_image(&[]).is_err());
    }

    #[test]
    fn test_probe_truncated_png() {
        let bytes = encode_image(64, 64, ImageFormat::Png);
        assert!(probe_image(&bytes[..12]).is_err());
    }
}
