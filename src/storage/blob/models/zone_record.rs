use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Attribution embedded in every published document
pub const LICENSE_TEXT: &str = "Data source: ENTSO-E Transparency Platform. \
Modified and licensed under CC BY 4.0 (https://creativecommons.org/licenses/by/4.0/)";

/// One day-ahead price sample; unique per zone by `time`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub time: DateTime<Utc>,
    pub price: f64,
}

/// The published per-zone JSON document (`<EIC>.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneDocument {
    pub zone: String,
    pub name: String,
    pub license: String,
    pub updated: DateTime<Utc>,
    pub points: usize,
    /// Rendered resolution, "15m" or "60m"
    pub res: String,
    /// Sorted ascending by time, deduplicated
    pub data: Vec<PricePoint>,
}

/// Lightweight sidecar metadata (`<EIC>.meta.json`), enough for the
/// status aggregator to work without reading full point series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneMetadata {
    pub zone: String,
    pub name: String,
    pub updated: DateTime<Utc>,
    pub count: usize,
    pub currency: String,
    /// Resolution in minutes, 15 or 60
    pub res: u32,
    /// Document revision last admitted for this zone
    pub seq: i64,
    pub latest: Option<DateTime<Utc>>,
}
