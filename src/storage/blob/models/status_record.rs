use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The published fleet snapshot (`status.json`), regenerated wholesale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusDocument {
    pub bridge: String,
    pub license: String,
    pub summary: StatusSummary,
    pub zones: Vec<ZoneStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSummary {
    pub total_zones: usize,
    /// Fraction of zones fully covered for the current local day, 2 decimals
    pub complete_today: f64,
    pub complete_tomorrow: f64,
    pub entsoe_service_online: bool,
    pub last_push: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneStatus {
    pub zone: String,
    pub name: String,
    pub updated: DateTime<Utc>,
    pub latest_data: Option<DateTime<Utc>>,
    pub is_complete_today: bool,
    pub is_complete_tomorrow: bool,
    pub points: usize,
    pub res: String,
    pub seq: i64,
    pub curr: String,
}
