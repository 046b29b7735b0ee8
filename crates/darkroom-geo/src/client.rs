use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use darkroom_index::GeoTag;

const SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

// Nominatim's usage policy requires an identifying user agent.
const USER_AGENT: &str = concat!("darkroom/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum GeoError {
    /// The service answered but had no match for the query text.
    #[error("no location found for \"{0}\"")]
    LocationNotFound(String),

    #[error("geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("geocoding service returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed geocoding response: {0}")]
    Malformed(String),
}

/// One hit from the Nominatim search API. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: String,
}

/// Free-text place resolution against Nominatim (OpenStreetMap).
///
/// Single shot, no retry, no cache: the user text is passed through
/// unmodified and the first result wins. Ambiguous queries ("Georgia")
/// resolve to whatever the service ranks first; callers that care show
/// the returned display name before applying it.
#[derive(Debug)]
pub struct GeoClient {
    http: Client,
}

impl GeoClient {
    pub fn new() -> Result<Self, GeoError> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http })
    }

    pub async fn resolve(&self, query: &str) -> Result<GeoTag, GeoError> {
        debug!(query, "geocoding lookup");
        let response = self
            .http
            .get(SEARCH_URL)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeoError::Status(response.status()));
        }

        let hits: Vec<SearchHit> = response.json().await?;
        let hit = hits
            .into_iter()
            .next()
            .ok_or_else(|| GeoError::LocationNotFound(query.to_string()))?;
        hit_to_tag(hit)
    }
}

fn hit_to_tag(hit: SearchHit) -> Result<GeoTag, GeoError> {
    let latitude: f64 = hit
        .lat
        .parse()
        .map_err(|_| GeoError::Malformed(format!("bad latitude: {}", hit.lat)))?;
    let longitude: f64 = hit
        .lon
        .parse()
        .map_err(|_| GeoError::Malformed(format!("bad longitude: {}", hit.lon)))?;
    Ok(GeoTag {
        latitude,
        longitude,
        place: hit.display_name,
    })
}
