use super::models::app_env::{AppEnv, Env};
use std::env;
use std::str::FromStr;

impl AppEnv {
    pub fn new() -> AppEnv {
        AppEnv {
            env: Env::from_str(&get_env_var("ENV")).expect("Unknown environment"),
            server_port: get_env_var("SERVER_PORT")
                .parse()
                .expect("PORT must be a number"),
            server_address: get_env_var("SERVER_ADDRESS"),
            storage_dir: get_env_var("STORAGE_DIR"),
            api_key: get_optional_env_var("API_KEY"),
            webhook_url: get_optional_env_var("WEBHOOK_URL"),
        }
    }
}

impl Default for AppEnv {
    fn default() -> Self {
        Self::new()
    }
}

fn get_env_var(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("ENV -> {} is not set", name))
}

// Optional variables: missing or blank both mean "not configured"
fn get_optional_env_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
