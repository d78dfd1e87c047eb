use serde::Deserialize;
use std::{fs, path::Path, time::Duration};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3001";
pub const DEFAULT_NOTIFICATION_TTL_MS: u64 = 5_000;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ConsoleConfig {
    pub server_url: String,
    pub notification_ttl_ms: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        ConsoleConfig {
            server_url: DEFAULT_SERVER_URL.to_string(),
            notification_ttl_ms: DEFAULT_NOTIFICATION_TTL_MS,
        }
    }
}

impl ConsoleConfig {
    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }
}

/// Reads the console settings from a YAML file, falling back to defaults when it doesn't exist.
pub fn load_config(config_file: &str) -> anyhow::Result<ConsoleConfig> {
    if !Path::new(config_file).exists() {
        return Ok(ConsoleConfig::default());
    }

    let config_data = fs::read_to_string(config_file)?;
    let config: ConsoleConfig = serde_yaml::from_str(&config_data)?;

    Ok(config)
}
