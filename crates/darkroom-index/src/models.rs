use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Geographic triple attached to a record.
///
/// Latitude, longitude, and the resolved place name always travel
/// together; a record carries either the whole triple or none of it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoTag {
    pub latitude: f64,
    pub longitude: f64,
    pub place: String,
}

/// One row of the image index, keyed by `filename`.
///
/// `format`, `width`, `height`, `megapixels`, `channels`, and `mode` are
/// fixed at ingestion time and never change afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub filename: String,
    /// Name of the event folder that physically contains the file.
    pub event: String,
    pub format: String,
    pub width: u32,
    pub height: u32,
    pub megapixels: f64,
    pub channels: u8,
    pub mode: String,
    /// Filesystem creation time, unix seconds.
    pub timestamp: f64,
    /// `timestamp` rendered as "%Y-%m-%d %H:%M:%S".
    pub creation: String,
    /// Capture timestamp from embedded metadata, verbatim. Absent when
    /// the file carries none; never fabricated.
    pub date_time: Option<String>,
    /// Calendar date derived from `date_time`.
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub edited: bool,
    #[serde(default)]
    pub geo: Option<GeoTag>,
}
