//! Upload decoding: raw file bytes to RGB buffers, and PNG encoding for
//! previews.
//!
//! The file type is taken from magic bytes, never from the extension or the
//! client's Content-Type header. Only JPEG and PNG are accepted.

use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageOutputFormat, RgbImage};
use tracing::debug;

/// Below this no JPEG or PNG can carry a header plus pixel data.
const MIN_IMAGE_BYTES: usize = 32;

pub const ACCEPTED_MIME_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No image provided")]
    Empty,
    #[error("Image data too small to be valid")]
    TooSmall,
    #[error("Image exceeds {limit_mb}MB limit")]
    TooLarge { limit_mb: u64 },
    #[error("Unsupported file type {0}. Please upload a JPEG or PNG image")]
    UnsupportedType(String),
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// Detect MIME type from file magic bytes.
pub fn detect_mime_from_bytes(bytes: &[u8]) -> &'static str {
    if bytes.len() < 4 {
        return "application/octet-stream";
    }

    // JPEG: FF D8 FF
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return "image/jpeg";
    }
    // PNG: 89 50 4E 47
    if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return "image/png";
    }
    // GIF87a / GIF89a
    if bytes.starts_with(b"GIF8") {
        return "image/gif";
    }
    // WebP: RIFF....WEBP
    if bytes.len() >= 12 && bytes[..4] == *b"RIFF" && bytes[8..12] == *b"WEBP" {
        return "image/webp";
    }
    if bytes.starts_with(b"%PDF") {
        return "application/pdf";
    }

    "application/octet-stream"
}

/// Validate size and type, decode, and convert to 8-bit RGB (alpha dropped).
pub fn decode_upload(bytes: &[u8], max_bytes: u64) -> Result<RgbImage, UploadError> {
    if bytes.is_empty() {
        return Err(UploadError::Empty);
    }
    if bytes.len() < MIN_IMAGE_BYTES {
        return Err(UploadError::TooSmall);
    }
    if bytes.len() as u64 > max_bytes {
        return Err(UploadError::TooLarge {
            limit_mb: (max_bytes / (1024 * 1024)).max(1),
        });
    }

    let mime = detect_mime_from_bytes(bytes);
    if !ACCEPTED_MIME_TYPES.contains(&mime) {
        return Err(UploadError::UnsupportedType(mime.to_string()));
    }

    let img = image::load_from_memory(bytes).map_err(|e| UploadError::Decode(e.to_string()))?;
    let (w, h) = img.dimensions();
    debug!(mime, width = w, height = h, size = bytes.len(), "Upload decoded");

    Ok(img.to_rgb8())
}

/// Encode an RGB buffer as PNG bytes.
pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>, UploadError> {
    let dynamic = DynamicImage::ImageRgb8(img.clone());
    let mut cursor = Cursor::new(Vec::new());
    dynamic
        .write_to(&mut cursor, ImageOutputFormat::Png)
        .map_err(|e| UploadError::Encode(format!("PNG encoding failed: {e}")))?;
    Ok(cursor.into_inner())
}
