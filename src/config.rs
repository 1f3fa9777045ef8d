use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::env_manager::{API_BASE_VAR, BEARER_TOKEN_VAR, CONFIG_PATH_VAR};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.calendly.com".to_string(),
            request_timeout_secs: 15,
            max_retries: 2,
            retry_backoff_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Locations a schedule may be requested for, lowercase
    pub locations: Vec<String>,
    pub max_concurrent_lookups: usize,
    pub deadline_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            locations: vec!["nashville".to_string(), "antioch".to_string()],
            max_concurrent_lookups: 8,
            deadline_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: "127.0.0.1:3000".to_string() }
    }
}

impl Config {
    /// Load the config file, creating it with defaults on first use.
    /// Environment overrides are applied on top of the file contents.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&get_config_path()?)?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        // If config doesn't exist, create default
        if !config_path.exists() {
            let default_config = Config::default();
            default_config.save_to(config_path)?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(config_path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = env::var(API_BASE_VAR) {
            if !base_url.trim().is_empty() {
                self.provider.base_url = base_url.trim().to_string();
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.schedule.locations.is_empty() {
            return Err(anyhow!("schedule.locations must list at least one location"));
        }
        if self.schedule.max_concurrent_lookups == 0 {
            return Err(anyhow!("schedule.max_concurrent_lookups must be at least 1"));
        }
        if self.schedule.deadline_secs == 0 || self.provider.request_timeout_secs == 0 {
            return Err(anyhow!("Timeouts must be at least one second"));
        }
        Ok(())
    }
}

/// Bearer token for the provider API, read from the environment
pub fn bearer_token() -> Result<SecretString> {
    match env::var(BEARER_TOKEN_VAR) {
        Ok(token) if !token.trim().is_empty() => Ok(SecretString::from(token.trim().to_string())),
        _ => Err(anyhow!("{} environment variable not set", BEARER_TOKEN_VAR)),
    }
}

fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_PATH_VAR) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    let proj_dirs = ProjectDirs::from("com", "pickup-schedule", "pickup-schedule")
        .context("Failed to determine config directory")?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}
