use super::app_env::Env;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub log: LogConfig,
    pub bridge: BridgeConfig,
    pub silence_watcher: SilenceWatcherConfig,
}

#[derive(Debug, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize)]
pub struct BridgeConfig {
    /// Payloads at or below this size are treated as connectivity heartbeats
    pub heartbeat_max_bytes: usize,
    /// Rolling retention window for price points
    pub prune_window_hours: i64,
    /// The feed counts as online while the last push is this recent
    pub online_threshold_minutes: i64,
}

#[derive(Debug, Deserialize)]
pub struct SilenceWatcherConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
    /// Silence longer than this fires the connection-lost webhook
    pub alert_after_minutes: i64,
}

impl AppConfig {
    pub fn new(env: &Env) -> Self {
        let path = format!("config/{env}.toml");
        let raw = std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Cannot read config file {path}: {e}"));
        toml::from_str(&raw).unwrap_or_else(|e| panic!("Cannot parse config file {path}: {e}"))
    }
}
