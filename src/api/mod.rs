pub mod health_api;
pub mod ingest;
pub mod status;
pub mod zones;

pub use health_api::health_api;
pub use ingest::ingest_push;
pub use status::{get_status_file, root_get};
pub use zones::get_zone_file;

use crate::app_state::models::AppState;
use axum::http::{HeaderMap, StatusCode};
use std::collections::HashMap;

/// Gate for the read endpoints. Without a configured API key the data
/// is public; with one, the caller must present it as a `key` query
/// parameter or an `x-api-key` header.
pub(crate) fn check_read_key(
    app_state: &AppState,
    headers: &HeaderMap,
    query: &HashMap<String, String>,
) -> Result<(), StatusCode> {
    let Some(expected) = app_state.settings.app_env.api_key.as_deref() else {
        return Ok(());
    };

    let presented = query
        .get("key")
        .map(String::as_str)
        .or_else(|| headers.get("x-api-key").and_then(|v| v.to_str().ok()));

    match presented {
        Some(key) if constant_time_eq(key.as_bytes(), expected.as_bytes()) => Ok(()),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
