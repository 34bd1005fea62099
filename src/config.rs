use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Example: `http://192.168.1.2:8080/`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path of the web UI below `base_url`
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Applies to every request, including authentication
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
    /// Any proxy url reqwest understands, e.g. `socks5://127.0.0.1:1080`
    pub proxy: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:44822/".to_string()
}

fn default_path() -> String {
    "/gui/".to_string()
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_timeout() -> u64 {
    5000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            path: default_path(),
            username: default_username(),
            password: String::new(),
            timeout_ms: default_timeout(),
            proxy: None,
        }
    }
}

impl Config {
    pub async fn load(path: &Path) -> Result<Config> {
        let config_str = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Cannot read config path {}", path.display()))?;
        let config = toml::from_str::<Config>(&config_str).context("Config file corrupted")?;
        Ok(config)
    }

    /// Same config pointed at another server, used heavily by tests.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}
