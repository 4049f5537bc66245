// File: src/services/bridge/status.rs
use crate::app_state::models::AppState;
use crate::services::bridge::zones;
use crate::storage::blob::models::status_record::{StatusDocument, StatusSummary, ZoneStatus};
use crate::storage::blob::models::zone_record::{LICENSE_TEXT, ZoneMetadata};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::debug;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub struct StatusAggregator {
    app_state: Arc<AppState>,
}

impl StatusAggregator {
    pub fn new(app_state: Arc<AppState>) -> Self {
        Self { app_state }
    }

    /// Полная перегенерация status.json из метаданных всех зон.
    /// `last_push` — момент последнего контакта с источником (push или
    /// heartbeat), от него считается признак entsoe_service_online.
    pub async fn rebuild(&self, last_push: DateTime<Utc>) -> Result<StatusDocument, BoxError> {
        let now = Utc::now();
        let metadata = self
            .app_state
            .blob_service
            .repository_zone
            .list_metadata()
            .await?;

        let mut statuses: Vec<ZoneStatus> =
            metadata.iter().map(|meta| zone_status(meta, now)).collect();
        // Свежие зоны первыми
        statuses.sort_by(|a, b| b.updated.cmp(&a.updated));

        let total = statuses.len();
        let complete_today = statuses.iter().filter(|z| z.is_complete_today).count();
        let complete_tomorrow = statuses.iter().filter(|z| z.is_complete_tomorrow).count();
        let threshold = self
            .app_state
            .settings
            .app_config
            .bridge
            .online_threshold_minutes;

        let document = StatusDocument {
            bridge: format!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            license: LICENSE_TEXT.to_string(),
            summary: StatusSummary {
                total_zones: total,
                complete_today: ratio(complete_today, total),
                complete_tomorrow: ratio(complete_tomorrow, total),
                entsoe_service_online: now - last_push <= Duration::minutes(threshold),
                last_push,
            },
            zones: statuses,
        };

        self.app_state
            .blob_service
            .repository_status
            .put_status(&document)
            .await?;

        debug!(
            "Status rebuilt: {} zones, {:.2} today / {:.2} tomorrow complete",
            total, document.summary.complete_today, document.summary.complete_tomorrow
        );
        Ok(document)
    }
}

/// Строка статуса одной зоны. Зона «покрыта на день», если её последняя
/// точка плюс длительность разрешения достигает следующей локальной
/// полуночи этой зоны.
fn zone_status(meta: &ZoneMetadata, now: DateTime<Utc>) -> ZoneStatus {
    let (today_end, tomorrow_end) = zones::day_end_targets(&meta.zone, now);
    let covered_until = meta
        .latest
        .map(|latest| latest + Duration::minutes(meta.res as i64));
    let covers = |target: DateTime<Utc>| covered_until.map(|c| c >= target).unwrap_or(false);

    ZoneStatus {
        zone: meta.zone.clone(),
        name: meta.name.clone(),
        updated: meta.updated,
        latest_data: meta.latest,
        is_complete_today: covers(today_end),
        is_complete_tomorrow: covers(tomorrow_end),
        points: meta.count,
        res: format!("{}m", meta.res),
        seq: meta.seq,
        curr: meta.currency.clone(),
    }
}

/// Доля с округлением до двух знаков; пустой флот даёт 0
fn ratio(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    ((part as f64 / total as f64) * 100.0).round() / 100.0
}
