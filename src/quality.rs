use std::io::Cursor;

use serde::Serialize;
use thiserror::Error;

use crate::upload::UploadedFile;

const MIN_DIMENSION: u32 = 480;
const MIN_ASPECT_RATIO: f64 = 0.5;
const MAX_ASPECT_RATIO: f64 = 2.0;
const LARGE_FILE_SIZE: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub quality: Quality,
    pub issues: Vec<String>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Error)]
pub enum QualityError {
    #[error("Unable to read image dimensions: {0}")]
    Unreadable(#[from] image::ImageError),

    #[error("Unable to read image dimensions: {0}")]
    Io(#[from] std::io::Error),
}

/// Scores an upload on resolution, aspect ratio and size.
///
/// Only the image header is decoded.
pub fn analyze_image_quality(file: &UploadedFile) -> Result<QualityReport, QualityError> {
    let (width, height) = image::io::Reader::new(Cursor::new(&file.bytes[..]))
        .with_guessed_format()?
        .into_dimensions()?;

    let mut issues = Vec::new();

    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        issues.push("Low resolution (recommended: 480x480 or higher)".to_string());
    }

    let aspect_ratio = f64::from(width) / f64::from(height);
    if !(MIN_ASPECT_RATIO..=MAX_ASPECT_RATIO).contains(&aspect_ratio) {
        issues.push("Unusual aspect ratio (recommended: 1:1 to 2:1)".to_string());
    }

    if file.size_bytes() > LARGE_FILE_SIZE {
        issues.push("Large file size (may process slower)".to_string());
    }

    let quality = match issues.len() {
        0 => Quality::High,
        1 => Quality::Medium,
        _ => Quality::Low,
    };

    Ok(QualityReport {
        quality,
        issues,
        width,
        height,
    })
}
