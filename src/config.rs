use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::util::is_local_endpoint_url;

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1";
const CONFIG_DIR_NAME: &str = "openrouter-cli";
const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_PATH_ENV: &str = "OPENROUTER_CONFIG_PATH";
const API_KEY_ENV: &str = "OPENROUTER_API_KEY";
const API_URL_ENV: &str = "OPENROUTER_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
        }
    }
}

impl Config {
    /// Persisted settings with `OPENROUTER_API_KEY` / `OPENROUTER_API_URL`
    /// layered on top.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&config_path()?)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Settings exactly as stored on disk; defaults when the file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        let mut config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?;
        config.api_key = non_empty(config.api_key);
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create config directory '{}'", parent.display())
            })?;
        }
        let serialized = serde_json::to_string_pretty(self)?;
        std::fs::write(path, serialized)
            .with_context(|| format!("failed to write config file '{}'", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            bail!(
                "Invalid API URL '{}': expected http:// or https:// URL",
                self.api_url
            );
        }

        if !self.is_local_endpoint() && self.api_key.is_none() {
            bail!(
                "An API key must be set for non-local endpoints (url: '{}'). Run 'openrouter configure' or set {}.",
                self.api_url,
                API_KEY_ENV
            );
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Some(api_key) = non_empty(std::env::var(API_KEY_ENV).ok()) {
            self.api_key = Some(api_key);
        }
        if let Some(api_url) = non_empty(std::env::var(API_URL_ENV).ok()) {
            self.api_url = api_url;
        }
    }

    fn is_local_endpoint(&self) -> bool {
        is_local_endpoint_url(&self.api_url)
    }
}

pub fn config_path() -> Result<PathBuf> {
    if let Some(path) = non_empty(std::env::var(CONFIG_PATH_ENV).ok()) {
        return Ok(PathBuf::from(path));
    }
    let Some(base) = dirs::config_dir() else {
        bail!(
            "could not determine a configuration directory; set {}",
            CONFIG_PATH_ENV
        );
    };
    Ok(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
