use crate::env_config::models::app_setting::AppSettings;
use crate::services::bridge::webhook::WebhookNotifier;
use crate::storage::blob::blob_service::BlobService;

use std::sync::Arc;

pub struct AppState {
    pub settings: Arc<AppSettings>,
    pub blob_service: Arc<BlobService>,
    pub webhook: Arc<WebhookNotifier>,
}

impl AppState {
    pub fn new(
        settings: Arc<AppSettings>,
        blob_service: Arc<BlobService>,
        webhook: Arc<WebhookNotifier>,
    ) -> Self {
        Self {
            settings,
            blob_service,
            webhook,
        }
    }
}
