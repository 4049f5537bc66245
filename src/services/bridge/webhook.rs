use crate::storage::blob::models::zone_record::ZoneDocument;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Best-effort notifier for the downstream home-automation system.
/// Delivery failures are logged and swallowed: the webhook is not part
/// of the contract with the upstream feed and is never retried.
pub struct WebhookNotifier {
    url: Option<String>,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        match &url {
            Some(_) => info!("Outbound webhook notifications enabled"),
            None => debug!("No webhook URL configured, notifications disabled"),
        }

        Self { url, client }
    }

    pub async fn price_update(&self, document: &ZoneDocument) {
        let payload = json!({
            "event": "price_update",
            "zone": document.zone,
            "name": document.name,
            "updated": document.updated,
            "data": document.data,
        });
        self.post(payload, "price_update").await;
    }

    pub async fn connection_lost(&self, last_seen: DateTime<Utc>, minutes_silence: i64) {
        let payload = json!({
            "event": "alert_connection_lost",
            "message": format!("No ENTSO-E push received for {minutes_silence} minutes"),
            "last_seen": last_seen,
            "minutes_silence": minutes_silence,
            "entsoe_service_online": false,
        });
        self.post(payload, "alert_connection_lost").await;
    }

    async fn post(&self, payload: serde_json::Value, event: &str) {
        let Some(url) = self.url.as_deref() else {
            return;
        };
        match self.client.post(url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Webhook {} delivered", event)
            }
            Ok(response) => warn!("Webhook {} returned {}", event, response.status()),
            Err(e) => warn!("Webhook {} delivery failed: {}", event, e),
        }
    }
}
