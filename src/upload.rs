//! Upload validation and MIME labelling for user-supplied images.
//!
//! Both checks trust the metadata the browser attached to the upload. Neither
//! looks at the bytes themselves.

use axum::body::Bytes;
use thiserror::Error;

/// Media types accepted by [`validate_image_file`]. Matched exactly.
pub const SUPPORTED_MEDIA_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Largest accepted upload, inclusive.
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// An image as received from a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    /// Content type sent by the client, empty when none was sent.
    pub declared_media_type: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(
        name: impl Into<String>,
        declared_media_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            declared_media_type: declared_media_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("Unsupported format. Supported: JPG, PNG, WebP, GIF")]
    UnsupportedFormat,

    #[error("File too large. Maximum: 10MB")]
    TooLarge,
}

/// Checks the declared type, then the size. The first failure wins.
pub fn validate_image_file(file: &UploadedFile) -> Result<(), UploadRejection> {
    if !SUPPORTED_MEDIA_TYPES.contains(&file.declared_media_type.as_str()) {
        return Err(UploadRejection::UnsupportedFormat);
    }

    if file.size_bytes() > MAX_FILE_SIZE {
        return Err(UploadRejection::TooLarge);
    }

    Ok(())
}

/// Best-effort media type for labelling an inline image part.
///
/// A non-empty declared type is returned as is. Otherwise the filename suffix
/// is checked (case-sensitive), and anything unrecognised is labelled JPEG.
pub fn resolve_mime_type(file: &UploadedFile) -> String {
    if !file.declared_media_type.is_empty() {
        return file.declared_media_type.clone();
    }

    let name = file.name.as_str();
    let resolved = if name.ends_with(".png") {
        "image/png"
    } else if name.ends_with(".jpg") || name.ends_with(".jpeg") {
        "image/jpeg"
    } else if name.ends_with(".webp") {
        "image/webp"
    } else if name.ends_with(".gif") {
        "image/gif"
    } else {
        DEFAULT_MIME_TYPE
    };

    resolved.to_string()
}
