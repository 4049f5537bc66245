use crate::app_state::models::AppState;
use crate::services::bridge::merger::{MergeOutcome, PriceMerger};
use crate::services::bridge::status::StatusAggregator;
use axum::body::Bytes;
use axum::extract::Extension;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Фиксированный SOAP-ответ по IEC 62325-504: источник ждёт его на
/// каждый push, иначе считает доставку неудачной и начинает ретраи
const ACK_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://www.w3.org/2003/05/soap-envelope">
  <SOAP-ENV:Header/>
  <SOAP-ENV:Body>
    <msg:ResponseMessage xmlns:msg="http://iec.ch/TC57/2011/schema/message">
      <msg:Header>
        <msg:Verb>create</msg:Verb>
        <msg:Noun>ETP-DOCUMENT</msg:Noun>
        <msg:Context>PRODUCTION</msg:Context>
        <msg:AckRequired>false</msg:AckRequired>
      </msg:Header>
      <msg:Reply>
        <msg:Result>OK</msg:Result>
      </msg:Reply>
    </msg:ResponseMessage>
  </SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#;

/// Приём push от ENTSO-E. Подтверждение уходит сразу, разбор и слияние
/// выполняются в отдельной задаче: источник не должен ждать нашу запись.
/// Тело принимается как сырые байты: невалидный UTF-8 не повод для 400,
/// контракт с источником требует фиксированный ACK на любой POST
pub async fn ingest_push(
    Extension(app_state): Extension<Arc<AppState>>,
    body: Bytes,
) -> impl IntoResponse {
    let heartbeat_max = app_state.settings.app_config.bridge.heartbeat_max_bytes;

    if body.len() <= heartbeat_max {
        debug!("Received heartbeat push ({} bytes)", body.len());
        tokio::spawn(async move {
            let now = Utc::now();
            if let Err(e) = app_state
                .blob_service
                .repository_status
                .set_last_update(now)
                .await
            {
                error!("Failed to record heartbeat marker: {}", e);
                return;
            }
            let aggregator = StatusAggregator::new(app_state);
            if let Err(e) = aggregator.rebuild(now).await {
                error!("Status rebuild after heartbeat failed: {}", e);
            }
        });
    } else {
        debug!("Received market document push ({} bytes)", body.len());
        tokio::spawn(async move {
            let xml = String::from_utf8_lossy(&body);
            let merger = PriceMerger::new(app_state);
            match merger.process_push(&xml).await {
                Ok(MergeOutcome::Merged {
                    zone,
                    new_points,
                    total,
                }) => info!("Zone {} updated: {} new points, {} total", zone, new_points, total),
                Ok(outcome) => debug!("Push processed without a write: {:?}", outcome),
                Err(e) => error!("Failed to process market document: {}", e),
            }
        });
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/soap+xml")],
        ACK_XML,
    )
}
