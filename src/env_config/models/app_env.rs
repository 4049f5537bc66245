use std::fmt;
use std::str::FromStr;

/// Runtime environment selector, controls config file and log defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Env {
    Local,
    Production,
}

impl FromStr for Env {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Env::Local),
            "production" | "prod" => Ok(Env::Production),
            other => Err(format!("Unknown environment: {other}")),
        }
    }
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Env::Local => write!(f, "local"),
            Env::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug)]
pub struct AppEnv {
    pub env: Env,
    pub server_address: String,
    pub server_port: u16,
    /// Root directory of the blob store (zone files, status file, marker)
    pub storage_dir: String,
    /// Shared secret for the read endpoints; absent = open read access
    pub api_key: Option<String>,
    /// Downstream webhook URL; absent = notifications disabled
    pub webhook_url: Option<String>,
}

impl AppEnv {
    pub fn is_local(&self) -> bool {
        self.env == Env::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_from_str() {
        assert_eq!(Env::from_str("local").unwrap(), Env::Local);
        assert_eq!(Env::from_str("PRODUCTION").unwrap(), Env::Production);
        assert_eq!(Env::from_str("prod").unwrap(), Env::Production);
        assert!(Env::from_str("staging").is_err());
    }

    #[test]
    fn test_env_display() {
        assert_eq!(Env::Local.to_string(), "local");
        assert_eq!(Env::Production.to_string(), "production");
    }
}
