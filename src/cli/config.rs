use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::FileCredentialStore;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    pub server_url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CliConfig {
    pub fn server_url(&self) -> &str {
        self.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    pub fn set_server_url(&mut self, url: String) {
        self.server_url = Some(url);
        self.updated_at = Some(Utc::now());
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("CATALOG_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("catalog").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_cli_config() -> anyhow::Result<CliConfig> {
    let config_file = get_config_dir()?.join("cli.json");

    if !config_file.exists() {
        return Ok(CliConfig::default());
    }

    let content = fs::read_to_string(config_file)?;
    let config: CliConfig = serde_json::from_str(&content)?;
    Ok(config)
}

pub fn save_cli_config(config: &CliConfig) -> anyhow::Result<()> {
    let config_file = get_config_dir()?.join("cli.json");

    let content = serde_json::to_string_pretty(config)?;
    fs::write(config_file, content)?;
    Ok(())
}

pub fn credential_store() -> anyhow::Result<FileCredentialStore> {
    Ok(FileCredentialStore::new(get_config_dir()?.join("token")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_local_server() {
        let mut config = CliConfig::default();
        assert_eq!(config.server_url(), DEFAULT_SERVER_URL);

        config.set_server_url("https://catalog.example.com".into());
        assert_eq!(config.server_url(), "https://catalog.example.com");
        assert!(config.updated_at.is_some());
    }

    #[test]
    fn reads_config_without_timestamp() {
        let config: CliConfig = serde_json::from_str(r#"{"server_url":"http://127.0.0.1:9000"}"#).unwrap();
        assert_eq!(config.server_url(), "http://127.0.0.1:9000");
        assert!(config.updated_at.is_none());
    }
}
