use crate::app_state::models::AppState;
use crate::env_config::models::app_config::{
    AppConfig, BridgeConfig, LogConfig, SilenceWatcherConfig,
};
use crate::env_config::models::app_env::{AppEnv, Env};
use crate::env_config::models::app_setting::AppSettings;
use crate::services::bridge::webhook::WebhookNotifier;
use crate::storage::blob::blob_service::BlobService;
use std::path::Path;
use std::sync::Arc;

/// Application state over a throwaway storage directory, no API key
/// and no webhook configured.
pub(crate) fn test_state(storage_dir: &Path) -> Arc<AppState> {
    test_state_with_key(storage_dir, None)
}

pub(crate) fn test_state_with_key(storage_dir: &Path, api_key: Option<&str>) -> Arc<AppState> {
    let settings = Arc::new(AppSettings {
        app_config: AppConfig {
            log: LogConfig {
                level: "debug".to_string(),
                format: "plain".to_string(),
            },
            bridge: BridgeConfig {
                heartbeat_max_bytes: 50,
                prune_window_hours: 48,
                online_threshold_minutes: 60,
            },
            silence_watcher: SilenceWatcherConfig {
                enabled: false,
                interval_seconds: 900,
                alert_after_minutes: 60,
            },
        },
        app_env: AppEnv {
            env: Env::Local,
            server_address: "0.0.0.0".to_string(),
            server_port: 0,
            storage_dir: storage_dir.to_string_lossy().into_owned(),
            api_key: api_key.map(str::to_string),
            webhook_url: None,
        },
    });

    let blob_service =
        Arc::new(BlobService::new(&settings).expect("test storage directory must be writable"));
    let webhook = Arc::new(WebhookNotifier::new(None));

    Arc::new(AppState::new(settings, blob_service, webhook))
}
