use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::fetcher::DEFAULT_COUNTRY;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org";
pub const DEFAULT_PROBE_ADDR: &str = "1.1.1.1:53";

/// Runtime settings, read from `NEWSREEL_*` environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_country: String,
    pub request_timeout: Duration,
    pub data_dir: PathBuf,
    pub probe_addr: String,
    pub probe_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_country: DEFAULT_COUNTRY.to_string(),
            request_timeout: Duration::from_secs(30),
            data_dir: default_data_dir(std::env::var("HOME").ok()),
            probe_addr: DEFAULT_PROBE_ADDR.to_string(),
            probe_timeout: Duration::from_secs(3),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source
    /// Unset or empty variables keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Config {
            data_dir: default_data_dir(get("HOME")),
            ..Config::default()
        };

        if let Some(key) = get("NEWSREEL_API_KEY") {
            config.api_key = Some(key);
        }
        if let Some(url) = get("NEWSREEL_BASE_URL") {
            config.base_url = url;
        }
        if let Some(country) = get("NEWSREEL_COUNTRY") {
            config.default_country = country.to_lowercase();
        }
        if let Some(secs) = get("NEWSREEL_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("Invalid NEWSREEL_TIMEOUT_SECS: {}", secs))?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = get("NEWSREEL_DATA_DIR") {
            config.data_dir = PathBuf::from(shellexpand::tilde(&dir).to_string());
        } else if let Some(xdg_data) = get("XDG_DATA_HOME") {
            config.data_dir = PathBuf::from(xdg_data).join("newsreel");
        }
        if let Some(addr) = get("NEWSREEL_PROBE_ADDR") {
            config.probe_addr = addr;
        }

        Ok(config)
    }
}

/// Falls back to ~/.local/share/newsreel (XDG default)
fn default_data_dir(home: Option<String>) -> PathBuf {
    let home = home.unwrap_or_else(|| ".".to_string());
    PathBuf::from(home).join(".local/share/newsreel")
}
