use crate::app_state::models::AppState;
use crate::services::bridge::status::StatusAggregator;
use axum::Json;
use axum::extract::{Extension, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

/// GET /status.json — the current fleet snapshot
pub async fn get_status_file(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if let Err(code) = super::check_read_key(&app_state, &headers, &query) {
        return code.into_response();
    }
    serve_status(&app_state).await
}

/// GET / — dispatches on query parameters: `?init` forces a status
/// rebuild, `?status` serves the snapshot, `?zone=<EIC>` serves one
/// zone, no parameters returns a plain identification banner
pub async fn root_get(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if query.contains_key("init") {
        if let Err(code) = super::check_read_key(&app_state, &headers, &query) {
            return code.into_response();
        }
        return rebuild_status(&app_state).await;
    }
    if query.contains_key("status") {
        if let Err(code) = super::check_read_key(&app_state, &headers, &query) {
            return code.into_response();
        }
        return serve_status(&app_state).await;
    }
    if let Some(zone) = query.get("zone") {
        if let Err(code) = super::check_read_key(&app_state, &headers, &query) {
            return code.into_response();
        }
        return super::zones::serve_zone(&app_state, zone).await;
    }

    format!(
        "{} v{} - ENTSO-E day-ahead price bridge\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
    .into_response()
}

async fn serve_status(app_state: &AppState) -> Response {
    match app_state.blob_service.repository_status.get_status().await {
        Ok(Some(status)) => Json(status).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            error!("Failed to read status snapshot: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn rebuild_status(app_state: &Arc<AppState>) -> Response {
    // Маркер сохраняется, если он уже есть: ручная инициализация не
    // должна выдавать источник за живой
    let last_push = match app_state.blob_service.repository_status.get_last_update().await {
        Ok(Some(at)) => at,
        Ok(None) => Utc::now(),
        Err(e) => {
            error!("Failed to read last-update marker: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let aggregator = StatusAggregator::new(app_state.clone());
    match aggregator.rebuild(last_push).await {
        Ok(document) => {
            info!("Status rebuilt on demand ({} zones)", document.summary.total_zones);
            format!("Status initialized: {} zones\n", document.summary.total_zones)
                .into_response()
        }
        Err(e) => {
            error!("On-demand status rebuild failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
