use crate::app_state::models::AppState;
use axum::Json;
use axum::extract::{Extension, Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;

/// GET /{zone}.json — the published 48-hour dataset for one zone
pub async fn get_zone_file(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(key): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if let Err(code) = super::check_read_key(&app_state, &headers, &query) {
        return code.into_response();
    }
    let Some(zone) = key.strip_suffix(".json") else {
        return StatusCode::NOT_FOUND.into_response();
    };
    serve_zone(&app_state, zone).await
}

pub(crate) async fn serve_zone(app_state: &AppState, zone: &str) -> Response {
    match app_state.blob_service.repository_zone.get_document(zone).await {
        Ok(Some(document)) => Json(document).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            error!("Failed to read zone document {}: {}", zone, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
