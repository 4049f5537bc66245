// File: src/services/bridge/merger.rs
use crate::app_state::models::AppState;
use crate::services::bridge::parser::{self, ParsedDocument};
use crate::services::bridge::status::StatusAggregator;
use crate::services::bridge::zones;
use crate::storage::blob::models::zone_record::{
    LICENSE_TEXT, PricePoint, ZoneDocument, ZoneMetadata,
};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Исход обработки одного push-документа
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// Документ не дал ни одной пригодной точки, хранилище не тронуто
    NoPoints,
    /// Устаревшая ревизия документа, отброшена целиком
    RejectedStale {
        zone: String,
        incoming_seq: i64,
        stored_seq: i64,
    },
    /// Слияние не изменило сохранённый набор точек, запись пропущена
    NoChange { zone: String },
    /// Новые данные записаны, статус перегенерирован
    Merged {
        zone: String,
        new_points: usize,
        total: usize,
    },
}

pub struct PriceMerger {
    app_state: Arc<AppState>,
}

impl PriceMerger {
    pub fn new(app_state: Arc<AppState>) -> Self {
        Self { app_state }
    }

    /// Полный конвейер приёма: разбор, проверка ревизии, слияние,
    /// обрезка окна, запись и перегенерация статуса
    pub async fn process_push(&self, xml: &str) -> Result<MergeOutcome, BoxError> {
        let Some(document) = parser::parse_document(xml) else {
            debug!("Push without a zone identifier, ignoring");
            return Ok(MergeOutcome::NoPoints);
        };
        if document.points.is_empty() {
            debug!("Push for zone {} carried no valid points", document.zone);
            return Ok(MergeOutcome::NoPoints);
        }
        self.merge_document(document).await
    }

    async fn merge_document(&self, document: ParsedDocument) -> Result<MergeOutcome, BoxError> {
        let repo = &self.app_state.blob_service.repository_zone;
        let now = Utc::now();

        // Чтение-слияние-запись для одной зоны не сериализовано: при
        // одновременных push одной зоны побеждает поздняя запись. Документ
        // и сайдкар-метаданные тоже пишутся парой отдельных rename, между
        // ними возможен сбой. Push приходит не чаще раза в час, следующий
        // merge перезаписывает оба файла, компромисс принят.
        let stored = repo.get_document(&document.zone).await?;
        let stored_meta = repo.get_metadata(&document.zone).await?;
        let stored_points = stored.map(|d| d.data).unwrap_or_default();
        let stored_seq = stored_meta.as_ref().map(|m| m.seq).unwrap_or(0);

        if document.sequence < stored_seq && !stored_points.is_empty() {
            info!(
                "Rejected stale document for zone {}: seq {} < stored {}",
                document.zone, document.sequence, stored_seq
            );
            return Ok(MergeOutcome::RejectedStale {
                zone: document.zone,
                incoming_seq: document.sequence,
                stored_seq,
            });
        }

        let existing = to_map(&stored_points);
        let merged = merge_points(&existing, &document.points);
        let window = self.app_state.settings.app_config.bridge.prune_window_hours;
        let pruned = prune_points(merged, now - Duration::hours(window));

        // Идемпотентность: совпадающее содержимое не перезаписывается,
        // кроме самой первой записи зоны
        if pruned == existing && !stored_points.is_empty() {
            debug!("Zone {} unchanged after merge, skipping write", document.zone);
            return Ok(MergeOutcome::NoChange {
                zone: document.zone,
            });
        }

        let name = zones::resolve_zone_name(&document.zone, document.zone_name.as_deref());
        let data: Vec<PricePoint> = pruned
            .iter()
            .map(|(time, price)| PricePoint {
                time: *time,
                price: *price,
            })
            .collect();
        let new_points = pruned
            .keys()
            .filter(|time| !existing.contains_key(*time))
            .count();
        let total = data.len();
        let latest = data.last().map(|p| p.time);

        let zone_document = ZoneDocument {
            zone: document.zone.clone(),
            name: name.clone(),
            license: LICENSE_TEXT.to_string(),
            updated: now,
            points: total,
            res: format!("{}m", document.resolution_min),
            data,
        };
        let metadata = ZoneMetadata {
            zone: document.zone.clone(),
            name,
            updated: now,
            count: total,
            currency: document.currency.clone(),
            res: document.resolution_min,
            seq: document.sequence,
            latest,
        };

        repo.put(&zone_document, &metadata).await?;
        self.app_state
            .blob_service
            .repository_status
            .set_last_update(now)
            .await?;

        info!(
            "Merged {} new points for zone {} ({} total, seq {})",
            new_points, zone_document.zone, total, document.sequence
        );

        // Перегенерация статуса и webhook не должны ронять сам merge
        let aggregator = StatusAggregator::new(self.app_state.clone());
        if let Err(e) = aggregator.rebuild(now).await {
            warn!("Status rebuild after merge failed: {}", e);
        }
        self.app_state.webhook.price_update(&zone_document).await;

        Ok(MergeOutcome::Merged {
            zone: zone_document.zone,
            new_points,
            total,
        })
    }
}

pub(crate) fn to_map(points: &[PricePoint]) -> BTreeMap<DateTime<Utc>, f64> {
    points.iter().map(|p| (p.time, p.price)).collect()
}

/// Накладывает новые точки поверх сохранённых: ключ — метка времени,
/// при совпадении побеждает входящее значение. Исторические точки,
/// отсутствующие в новом документе, сохраняются (smart diff: пропуск
/// точки источником не означает её удаление).
pub(crate) fn merge_points(
    existing: &BTreeMap<DateTime<Utc>, f64>,
    incoming: &[PricePoint],
) -> BTreeMap<DateTime<Utc>, f64> {
    let mut merged = existing.clone();
    for point in incoming {
        merged.insert(point.time, point.price);
    }
    merged
}

/// Отбрасывает точки старше границы окна; точка ровно на границе остаётся
pub(crate) fn prune_points(
    points: BTreeMap<DateTime<Utc>, f64>,
    cutoff: DateTime<Utc>,
) -> BTreeMap<DateTime<Utc>, f64> {
    points.into_iter().filter(|(time, _)| *time >= cutoff).collect()
}
