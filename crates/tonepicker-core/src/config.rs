use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, anyhow};

pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai/v1";
pub const DEFAULT_MODEL: &str = "mistral-small";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// Provider settings used by [`crate::ai::MistralClient`].
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub models_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            timeout: Duration::from_secs(30),
            models_timeout: Duration::from_secs(10),
        }
    }
}

/// Settings read from `config.json` and the environment. Every field is
/// optional; absent values fall back to defaults and never fail startup.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub port: Option<u16>,
    pub cache_ttl_secs: Option<u64>,
    pub log_level: Option<String>,
    pub server_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the config file (if any), then applies environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::get_config_path() {
            Ok(path) => Self::load_from(&path)?,
            Err(_) => Self::new(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Like [`Config::load`], but an unreadable file falls back to defaults.
    /// Environment overrides apply either way; the file error is returned
    /// so the caller can log it once tracing is up.
    pub fn load_or_defaults() -> (Self, Option<anyhow::Error>) {
        let path = Self::get_config_path().ok();
        Self::load_or_defaults_from(path.as_deref(), |name| std::env::var(name).ok())
    }

    pub fn load_or_defaults_from<F>(path: Option<&Path>, lookup: F) -> (Self, Option<anyhow::Error>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let (mut config, error) = match path.map(Self::load_from) {
            Some(Ok(config)) => (config, None),
            Some(Err(err)) => (Self::new(), Some(err)),
            None => (Self::new(), None),
        };
        config.apply_env(lookup);
        (config, error)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Overrides fields from environment variables. Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = var("MISTRAL_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(url) = var("MISTRAL_API_URL") {
            self.api_url = Some(url);
        }
        if let Some(model) = var("MISTRAL_MODEL") {
            self.model = Some(model);
        }
        if let Some(port) = var("PORT") {
            match port.parse() {
                Ok(port) => self.port = Some(port),
                Err(_) => tracing::warn!(%port, "ignoring unparsable PORT"),
            }
        }
        if let Some(level) = var("TONEPICKER_LOG") {
            self.log_level = Some(level);
        }
        if let Some(url) = var("TONEPICKER_SERVER") {
            self.server_url = Some(url);
        }
    }

    pub fn provider(&self) -> ProviderConfig {
        let defaults = ProviderConfig::default();
        ProviderConfig {
            base_url: self
                .api_url
                .clone()
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            api_key: self.api_key.clone().filter(|k| !k.is_empty()),
            model: self.model.clone().unwrap_or(defaults.model),
            ..defaults
        }
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl_secs
            .map(Duration::from_secs)
            .unwrap_or(crate::cache::DEFAULT_TTL)
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn server_url(&self) -> String {
        self.server_url
            .clone()
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
    }

    /// First eight characters of the credential followed by `...`, for logs
    /// and the health endpoint.
    pub fn api_key_prefix(&self) -> Option<String> {
        self.provider()
            .api_key
            .map(|key| format!("{}...", key.chars().take(8).collect::<String>()))
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("tonepicker").join("config.json"))
    }
}
