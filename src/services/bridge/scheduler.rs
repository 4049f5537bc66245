// File: src/services/bridge/scheduler.rs
use crate::app_state::models::AppState;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Периодическая проверка тишины источника: если push и heartbeat не
/// приходили дольше порога, шлём тревогу в webhook
pub struct SilenceWatcher {
    app_state: Arc<AppState>,
}

impl SilenceWatcher {
    pub fn new(app_state: Arc<AppState>) -> Self {
        Self { app_state }
    }

    pub async fn start(&self) {
        let config = &self.app_state.settings.app_config.silence_watcher;
        if !config.enabled {
            info!("Silence watcher is disabled in config");
            return;
        }

        let interval_seconds = config.interval_seconds;
        info!(
            "Starting silence watcher with interval {} seconds",
            interval_seconds
        );

        let app_state = self.app_state.clone();
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(interval_seconds));
            // Первый тик срабатывает сразу, пропускаем его: при старте
            // маркер ещё мог не успеть обновиться
            interval.tick().await;

            loop {
                interval.tick().await;
                let watcher = SilenceWatcher::new(app_state.clone());
                match watcher.check_silence().await {
                    Ok(Some(minutes)) => {
                        warn!("Upstream feed silent for {} minutes", minutes)
                    }
                    Ok(None) => debug!("Upstream feed is healthy"),
                    Err(e) => error!("Silence check failed: {}", e),
                }
            }
        });
    }

    /// Возвращает Ok(Some(минуты тишины)), если порог превышен
    pub async fn check_silence(&self) -> Result<Option<i64>, BoxError> {
        let threshold = self
            .app_state
            .settings
            .app_config
            .silence_watcher
            .alert_after_minutes;

        let Some(last_seen) = self
            .app_state
            .blob_service
            .repository_status
            .get_last_update()
            .await?
        else {
            // Ни одного push с момента развёртывания, тревожить нечем
            debug!("No push marker yet, skipping silence check");
            return Ok(None);
        };

        let minutes = (Utc::now() - last_seen).num_minutes();
        if minutes <= threshold {
            return Ok(None);
        }

        self.app_state
            .webhook
            .connection_lost(last_seen, minutes)
            .await;
        Ok(Some(minutes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::bridge::test_support::test_state;
    use chrono::Duration;

    #[tokio::test]
    async fn test_no_marker_means_no_alert() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let watcher = SilenceWatcher::new(state);
        assert_eq!(watcher.check_silence().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_recent_push_is_quiet() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        state
            .blob_service
            .repository_status
            .set_last_update(Utc::now() - Duration::minutes(5))
            .await
            .unwrap();

        let watcher = SilenceWatcher::new(state);
        assert_eq!(watcher.check_silence().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_silence_past_threshold_alerts() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        state
            .blob_service
            .repository_status
            .set_last_update(Utc::now() - Duration::minutes(90))
            .await
            .unwrap();

        let watcher = SilenceWatcher::new(state);
        let silence = watcher.check_silence().await.unwrap();
        assert!(silence.is_some_and(|m| m >= 90));
    }
}
