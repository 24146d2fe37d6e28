//! Kairos configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::llm;

/// Project-local config file name
pub const LOCAL_CONFIG: &str = ".kairos.yml";

/// Main Kairos configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Storage configuration
    pub storage: StorageConfig,

    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Chill mode configuration
    pub chill: ChillConfig,
}

impl Config {
    /// Load configuration with fallback chain
    ///
    /// `--config PATH` > `./.kairos.yml` > `<config_dir>/kairos/kairos.yml` > defaults.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let local_config = PathBuf::from(LOCAL_CONFIG);
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        if let Some(user_config) = user_config_path()
            && user_config.exists()
        {
            match Self::load_from_file(&user_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    ///
    /// Any failure reads as "not configured"; the full load reports it later.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => {
                let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
                paths.extend(user_config_path());
                paths
            }
        };

        candidates
            .iter()
            .find(|p| p.exists())
            .and_then(|p| fs::read_to_string(p).ok())
            .and_then(|content| serde_yaml::from_str::<Self>(&content).ok())
            .and_then(|config| config.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Write the configuration as YAML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        fs::write(path, content).context(format!("Failed to write config to {}", path.display()))?;
        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }
}

/// `<config_dir>/kairos`
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("kairos"))
}

/// `<config_dir>/kairos/kairos.yml`
pub fn user_config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("kairos.yml"))
}

/// `<config_dir>/kairos/prompts`
pub fn user_prompts_dir() -> Option<PathBuf> {
    config_dir().map(|d| d.join("prompts"))
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file
    #[serde(rename = "db-path")]
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        // ~/.local/share/kairos/kairos.db on Linux
        let db_path = dirs::data_local_dir()
            .map(|d| d.join("kairos"))
            .unwrap_or_else(|| PathBuf::from(".kairos"))
            .join("kairos.db");

        Self { db_path }
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("gemini" or "anthropic")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API key stored in the config file, used when the env var is unset
    #[serde(rename = "api-key", skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// API base URL, defaults per provider
    #[serde(rename = "base-url", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key: None,
            base_url: None,
            max_tokens: 2048,
            timeout_ms: 60_000,
        }
    }
}

impl LlmConfig {
    /// API key from the environment, falling back to the config file
    pub fn api_key(&self) -> Option<String> {
        self.api_key_with(|name| std::env::var(name).ok())
    }

    /// Same as [`api_key`](Self::api_key) with an injectable env lookup
    pub fn api_key_with(&self, env: impl Fn(&str) -> Option<String>) -> Option<String> {
        env(&self.api_key_env)
            .or_else(|| self.api_key.clone())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }

    /// Configured base URL or the provider's default
    ///
    /// Empty for an unknown provider; client creation rejects those anyway.
    pub fn resolved_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .or_else(|| llm::default_base_url(&self.provider))
            .unwrap_or_default()
    }
}

/// Chill mode configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChillConfig {
    /// Topics suggestions are drawn from
    pub interests: Vec<String>,

    /// Fresh suggestions allowed per session
    #[serde(rename = "max-skips")]
    pub max_skips: u32,
}

impl Default for ChillConfig {
    fn default() -> Self {
        Self {
            interests: ["Technology", "Science", "Programming", "Hacker News"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_skips: 3,
        }
    }
}
