//! Remote space catalog client.
//!
//! Talks to the space service's statistics and metadata endpoints, and owns
//! the small pure decisions layered on the responses: the degenerate-bbox
//! fallback, the keep-start-vs-fit-bounds view decision, and human-readable
//! size formatting. Network and decode failures surface as `CatalogError`
//! and propagate to the caller; nothing here retries or recovers.

use foundation::{LngLatBounds, MapView};
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://xyz.api.here.com/hub/spaces";
pub const API_URL_ENV: &str = "SPACEVIEW_API_URL";

/// Display bounds substituted when the service reports an unset bbox.
pub const FALLBACK_BOUNDS: [f64; 4] = [-45.0, -45.0, 45.0, 45.0];

#[derive(Debug)]
pub enum CatalogError {
    Http(reqwest::Error),
    Status { url: String, status: u16 },
    Decode(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Http(e) => write!(f, "space request failed: {e}"),
            CatalogError::Status { url, status } => {
                write!(f, "space request to {url} returned status {status}")
            }
            CatalogError::Decode(msg) => write!(f, "space response malformed: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        CatalogError::Http(e)
    }
}

/// Statistics for one space, as reported by the `/statistics` endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceStatistics {
    /// West, south, east, north. May be the unset `[0,0,0,0]` sentinel;
    /// callers wanting display bounds go through [`display_bounds`].
    pub bbox: [f64; 4],
    pub byte_size: u64,
    pub feature_count: u64,
    /// Seed tag list, most frequent first as served.
    pub tags: Vec<String>,
}

/// Title and description from the space metadata endpoint.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SpaceInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

// The statistics payload wraps every field in a `{value}` envelope.
#[derive(Debug, Deserialize)]
struct ValueField<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatisticsResponse {
    bbox: ValueField<[f64; 4]>,
    byte_size: ValueField<u64>,
    count: ValueField<u64>,
    tags: ValueField<Vec<TagEntry>>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    #[serde(default)]
    key: Option<String>,
}

impl From<StatisticsResponse> for SpaceStatistics {
    fn from(r: StatisticsResponse) -> Self {
        SpaceStatistics {
            bbox: r.bbox.value,
            byte_size: r.byte_size.value,
            feature_count: r.count.value,
            tags: r
                .tags
                .value
                .into_iter()
                .filter_map(|t| t.key)
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpaceClient {
    http: reqwest::Client,
    base_url: String,
}

impl SpaceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        SpaceClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Base URL from `SPACEVIEW_API_URL`, falling back to the public
    /// service.
    pub fn from_env() -> Self {
        let base = std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        SpaceClient::new(base)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Tile URL template for the engine's space source.
    pub fn tile_url(&self, space_id: &str) -> String {
        format!("{}/{space_id}/tile/web/{{z}}_{{x}}_{{y}}", self.base_url())
    }

    pub async fn fetch_statistics(
        &self,
        space_id: &str,
        access_token: &str,
    ) -> Result<SpaceStatistics, CatalogError> {
        let url = format!(
            "{}/{space_id}/statistics?access_token={access_token}",
            self.base_url()
        );
        debug!(space_id, "fetching space statistics");
        let response: StatisticsResponse = self.get_json(&url).await?;
        Ok(response.into())
    }

    pub async fn fetch_space_info(
        &self,
        space_id: &str,
        access_token: &str,
    ) -> Result<SpaceInfo, CatalogError> {
        let url = format!("{}/{space_id}?access_token={access_token}", self.base_url());
        debug!(space_id, "fetching space metadata");
        self.get_json(&url).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }
}

/// Bounds to display for a space. The service reports `[0,0,0,0]` for a
/// space whose bbox was never computed; that sentinel is replaced with a
/// fixed box spanning ±45° in each axis.
pub fn display_bounds(bbox: [f64; 4]) -> LngLatBounds {
    if bbox == [0.0, 0.0, 0.0, 0.0] {
        debug!("bbox unset, using fallback bounds");
        LngLatBounds::from_wsen(FALLBACK_BOUNDS)
    } else {
        LngLatBounds::from_wsen(bbox)
    }
}

/// How to position the map after loading a space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewDecision {
    /// A start view was supplied and falls inside the bounds; keep it.
    KeepStart(MapView),
    /// No usable start view; fit the display bounds instead.
    FitBounds(LngLatBounds),
}

/// A supplied start view wins if it lies within the display bounds;
/// otherwise (or with no start view at all) the map fits the bounds.
pub fn decide_view(start: Option<MapView>, bounds: LngLatBounds) -> ViewDecision {
    match start {
        Some(view) if bounds.contains(view.center()) => ViewDecision::KeepStart(view),
        _ => ViewDecision::FitBounds(bounds),
    }
}

/// Space size as megabytes with one decimal when under 1000 MB, gigabytes
/// with one decimal otherwise.
pub fn format_size(bytes: u64) -> String {
    let mb = bytes as f64 / 1024.0 / 1024.0;
    if mb < 1000.0 {
        format!("{mb:.1} MB")
    } else {
        format!("{:.1} GB", mb / 1024.0)
    }
}

/// Compact count display: 1.5K, 2.3M, and so on, plain digits below 1000.
pub fn format_count(n: u64) -> String {
    let n = n as f64;
    if n < 1e3 {
        format!("{n:.0}")
    } else if n < 1e6 {
        format!("{}K", trim_decimal(n / 1e3))
    } else if n < 1e9 {
        format!("{}M", trim_decimal(n / 1e6))
    } else if n < 1e12 {
        format!("{}B", trim_decimal(n / 1e9))
    } else {
        format!("{}T", trim_decimal(n / 1e12))
    }
}

fn trim_decimal(value: f64) -> String {
    let s = format!("{value:.1}");
    match s.strip_suffix(".0") {
        Some(trimmed) => trimmed.to_string(),
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn statistics_response_unwraps_value_envelopes() {
        let raw = serde_json::json!({
            "bbox": { "value": [-10.0, -5.0, 10.0, 5.0] },
            "byteSize": { "value": 1048576 },
            "count": { "value": 1234 },
            "tags": { "value": [ {"key": "roads"}, {"key": ""}, {}, {"key": "parks"} ] }
        });
        let parsed: StatisticsResponse = serde_json::from_value(raw).unwrap();
        let stats = SpaceStatistics::from(parsed);
        assert_eq!(stats.bbox, [-10.0, -5.0, 10.0, 5.0]);
        assert_eq!(stats.byte_size, 1_048_576);
        assert_eq!(stats.feature_count, 1234);
        assert_eq!(stats.tags, vec!["roads".to_string(), "parks".to_string()]);
    }

    #[test]
    fn space_info_tolerates_missing_fields() {
        let info: SpaceInfo = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(info, SpaceInfo::default());

        let info: SpaceInfo =
            serde_json::from_value(serde_json::json!({ "title": "Buildings" })).unwrap();
        assert_eq!(info.title, "Buildings");
        assert_eq!(info.description, "");
    }

    #[test]
    fn degenerate_bbox_falls_back() {
        let bounds = display_bounds([0.0, 0.0, 0.0, 0.0]);
        assert_eq!(bounds.to_wsen(), FALLBACK_BOUNDS);

        let real = display_bounds([-10.0, -10.0, 10.0, 10.0]);
        assert_eq!(real.to_wsen(), [-10.0, -10.0, 10.0, 10.0]);
    }

    #[test]
    fn start_view_outside_bounds_fits_instead() {
        let bounds = LngLatBounds::from_wsen([-10.0, -10.0, 10.0, 10.0]);
        let start = MapView::new(50.0, 50.0, 5.0);
        assert_eq!(decide_view(Some(start), bounds), ViewDecision::FitBounds(bounds));
    }

    #[test]
    fn start_view_inside_bounds_is_kept() {
        let bounds = LngLatBounds::from_wsen([-10.0, -10.0, 10.0, 10.0]);
        let start = MapView::new(5.0, -5.0, 8.0);
        assert_eq!(decide_view(Some(start), bounds), ViewDecision::KeepStart(start));
    }

    #[test]
    fn no_start_view_always_fits() {
        let bounds = LngLatBounds::from_wsen([0.0, 0.0, 1.0, 1.0]);
        assert_eq!(decide_view(None, bounds), ViewDecision::FitBounds(bounds));
    }

    #[test]
    fn size_formats_as_mb_then_gb() {
        assert_eq!(format_size(1_048_576), "1.0 MB");
        assert_eq!(format_size(52_428_800), "50.0 MB");
        // 1000 MB tips over to GB.
        assert_eq!(format_size(1_048_576_000), "1.0 GB");
        assert_eq!(format_size(3_221_225_472), "3.0 GB");
    }

    #[test]
    fn count_formats_compactly() {
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_500), "1.5K");
        assert_eq!(format_count(2_000_000), "2M");
        assert_eq!(format_count(3_400_000_000), "3.4B");
        assert_eq!(format_count(1_200_000_000_000), "1.2T");
    }

    #[test]
    fn tile_url_appends_template() {
        let client = SpaceClient::new("https://xyz.example/hub/spaces/");
        assert_eq!(
            client.tile_url("abc123"),
            "https://xyz.example/hub/spaces/abc123/tile/web/{z}_{x}_{y}"
        );
    }
}
