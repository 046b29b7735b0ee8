use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::NaiveDate;
use exif::{In, Tag};
use tracing::debug;

/// Capture timestamp read from embedded EXIF: the raw tag value plus the
/// calendar date derived from it. Both stay absent when the file carries
/// no usable tag; a missing capture time is never substituted with the
/// file time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CaptureTime {
    pub date_time: Option<String>,
    pub date: Option<NaiveDate>,
}

impl CaptureTime {
    pub fn from_file(path: &Path) -> Self {
        let Ok(file) = File::open(path) else {
            return Self::default();
        };
        let mut reader = BufReader::new(file);
        let Ok(exif) = exif::Reader::new().read_from_container(&mut reader) else {
            debug!(path = %path.display(), "no EXIF container");
            return Self::default();
        };

        let date_time = get_string(&exif, Tag::DateTimeOriginal)
            .or_else(|| get_string(&exif, Tag::DateTime));
        let date = date_time.as_deref().and_then(date_from_exif);
        Self { date_time, date }
    }
}

fn get_string(exif: &exif::Exif, tag: Tag) -> Option<String> {
    exif.get_field(tag, In::PRIMARY)
        .map(|f| f.display_value().to_string().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Derive the calendar date from an EXIF timestamp string. EXIF writes
/// "YYYY:MM:DD HH:MM:SS"; some writers use dashes instead of colons.
pub fn date_from_exif(date_time: &str) -> Option<NaiveDate> {
    let date_part = date_time.split_whitespace().next()?;
    let normalized = date_part.replace(':', "-");
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d").ok()
}
