use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use chrono::{DateTime, Local};
use image::{ColorType, ImageFormat, ImageReader};
use thiserror::Error;
use tracing::debug;

use darkroom_index::ImageRecord;

use crate::capture::CaptureTime;

/// Extensions offered in the upload prompts. Anything else still works
/// when typed explicitly, as long as the decoder recognizes the file.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "bmp", "gif"];

pub fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The file exists but does not decode as an image. Ingestion must
    /// skip the file; no partial record is produced.
    #[error("not a readable image: {0}")]
    UnreadableImage(String),

    #[error("metadata I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Derive a full index record from an image file about to join `event`.
///
/// Pure with respect to the index: this only reads the file. Dimensions,
/// format, color mode, and channel count come from the decoder; the
/// capture timestamp comes from EXIF when present; the creation fields
/// come from the filesystem.
pub fn extract(path: &Path, event: &str) -> Result<ImageRecord, ExtractError> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader.format();
    let img = reader
        .decode()
        .map_err(|_| ExtractError::UnreadableImage(filename.clone()))?;

    let (width, height) = (img.width(), img.height());
    let color = img.color();

    let meta = fs::metadata(path)?;
    let created = meta.created().or_else(|_| meta.modified())?;
    let timestamp = created
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default();
    let creation = DateTime::<Local>::from(created)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();

    let capture = CaptureTime::from_file(path);
    debug!(
        %filename,
        width,
        height,
        has_capture_time = capture.date_time.is_some(),
        "metadata extracted"
    );

    Ok(ImageRecord {
        filename,
        event: event.to_string(),
        format: format_name(format),
        width,
        height,
        megapixels: megapixels(width, height),
        channels: color.channel_count(),
        mode: mode_name(color).to_string(),
        timestamp,
        creation,
        date_time: capture.date_time,
        date: capture.date,
        edited: false,
        geo: None,
    })
}

pub fn megapixels(width: u32, height: u32) -> f64 {
    f64::from(width) * f64::from(height) / 1e6
}

fn format_name(format: Option<ImageFormat>) -> String {
    match format {
        Some(ImageFormat::Jpeg) => "JPEG".to_string(),
        Some(ImageFormat::Png) => "PNG".to_string(),
        Some(ImageFormat::Tiff) => "TIFF".to_string(),
        Some(ImageFormat::Bmp) => "BMP".to_string(),
        Some(ImageFormat::Gif) => "GIF".to_string(),
        Some(other) => format!("{other:?}").to_uppercase(),
        None => "UNKNOWN".to_string(),
    }
}

fn mode_name(color: ColorType) -> &'static str {
    match color {
        ColorType::L8 | ColorType::L16 => "L",
        ColorType::La8 | ColorType::La16 => "LA",
        ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => "RGB",
        ColorType::Rgba8 | ColorType::Rgba16 | ColorType::Rgba32F => "RGBA",
        _ => "OTHER",
    }
}
