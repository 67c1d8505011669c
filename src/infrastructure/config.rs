use crate::domain::error::TrackError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_API_URL: &str = "ORDERTRACK_API_URL";
pub const ENV_TOKEN: &str = "ORDERTRACK_TOKEN";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_enable_emoji")]
    pub enable_emoji: bool,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: Logging,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    pub http_proxy: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    #[serde(default = "default_grace_ms")]
    pub grace_ms: u64,
    #[serde(default)]
    pub evict_failures: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Logging {
    #[serde(default = "default_enable")]
    pub enable: bool,
    pub path: Option<String>,
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            enable_emoji: true,
            api: ApiConfig::default(),
            cache: CacheConfig::default(),
            logging: Logging::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
            http_proxy: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            grace_ms: default_grace_ms(),
            evict_failures: false,
        }
    }
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            enable: true,
            path: None,
            level: default_log_level(),
        }
    }
}

impl Logging {
    /// Filter directive for the configured level, `warn` when unrecognised
    pub fn filter_directive(&self) -> &'static str {
        match self.level.to_uppercase().as_str() {
            "DEBUG" => "debug",
            "INFO" => "info",
            "WARN" => "warn",
            "ERROR" => "error",
            _ => "warn",
        }
    }
}

// Defaults
fn default_theme() -> String {
    "classic".to_string()
}
fn default_enable_emoji() -> bool {
    true
}
fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_window_ms() -> u64 {
    2000
}
fn default_grace_ms() -> u64 {
    1000
}
fn default_enable() -> bool {
    true
}
fn default_log_level() -> String {
    "WARN".to_string()
}

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ordertrack").join("config.toml"))
}

pub fn parse_config(content: &str) -> Result<Config, TrackError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), TrackError> {
    let url = config.api.base_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(TrackError::Config(format!(
            "api.base_url must be an http(s) URL, got '{}'",
            config.api.base_url
        )));
    }
    if config.api.timeout_secs == 0 {
        return Err(TrackError::Config(
            "api.timeout_secs must be greater than zero".to_string(),
        ));
    }
    if config.cache.window_ms == 0 {
        return Err(TrackError::Config(
            "cache.window_ms must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Environment variables win over the file
pub fn apply_env_overrides(
    config: &mut Config,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
        config.api.base_url = url.trim().to_string();
    }
    if let Some(token) = lookup(ENV_TOKEN).filter(|v| !v.trim().is_empty()) {
        config.api.token = Some(token.trim().to_string());
    }
}

pub fn load_config_from(path: &Path) -> Result<Config, TrackError> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)?;
    match parse_config(&content) {
        Ok(config) => Ok(config),
        Err(e) => {
            eprintln!(
                "Warning: Failed to parse config file: {}. Using defaults.",
                e
            );
            Ok(Config::default())
        }
    }
}

pub fn load_config() -> Result<Config, TrackError> {
    let mut config = match get_config_path() {
        Some(path) => load_config_from(&path)?,
        None => Config::default(),
    };
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    Ok(config)
}

pub fn generate_config_sample() -> Result<(), TrackError> {
    let config_path = get_config_path();

    if let Some(path) = config_path {
        if path.exists() {
            eprintln!("Config file already exists at: {}", path.display());
            return Ok(());
        }

        // Create directory if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let sample = Config::default();
        let toml_content = toml::to_string_pretty(&sample)
            .map_err(|e| TrackError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(&path, toml_content)
            .map_err(|e| TrackError::Config(format!("Failed to write config file: {}", e)))?;
        println!("Generated config file at: {}", path.display());
    } else {
        return Err(TrackError::Config(
            "Cannot determine config directory".to_string(),
        ));
    }

    Ok(())
}
