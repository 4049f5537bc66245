use crate::app_state::models::AppState;
use axum::extract::Extension;
use axum::http::StatusCode;
use std::sync::Arc;

pub async fn health_api(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<StatusCode, StatusCode> {
    // Check that the blob store is reachable and listable
    let storage_ok = app_state
        .blob_service
        .repository_zone
        .list_metadata()
        .await
        .is_ok();

    if storage_ok {
        Ok(StatusCode::OK)
    } else {
        Err(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::bridge::test_support::test_state;

    #[tokio::test]
    async fn test_healthy_storage() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        assert_eq!(health_api(Extension(state)).await, Ok(StatusCode::OK));
    }
}
