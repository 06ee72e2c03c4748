//! Configuration loading, validation, and management for SourceChat.
//!
//! Loads configuration from `~/.sourcechat/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Value shipped in `.env.example` files; treated as "no key".
const PLACEHOLDER_API_KEY: &str = "your_api_key_here";

/// The default instruction sent as the first message of every request.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant. If content is provided, \
base your answers on that content. Otherwise, provide helpful and informative responses based on \
your general knowledge.";

/// The root configuration structure.
///
/// Maps directly to `~/.sourcechat/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Bearer credential for the completion provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Completion provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Grounding content and prompt settings
    #[serde(default)]
    pub context: ContextConfig,

    /// Outbound HTTP settings
    #[serde(default)]
    pub http: HttpConfig,
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("context", &self.context)
            .field("http", &self.http)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Display name, used in logs
    #[serde(default = "default_provider_name")]
    pub name: String,

    /// Base URL of the OpenAI-compatible API (without `/chat/completions`)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Response-length cap per reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_provider_name() -> String {
    "deepseek".into()
}
fn default_base_url() -> String {
    "https://api.deepseek.com".into()
}
fn default_model() -> String {
    "deepseek-chat".into()
}
fn default_temperature() -> f64 {
    0.7
}
fn default_max_tokens() -> u32 {
    2000
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// How extracted content is keyed in the session cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKeyMode {
    /// Key by URL or file name only.
    Identifier,
    /// Key uploads by file name plus a SHA-256 of their bytes.
    #[default]
    ContentHash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Maximum characters of grounding content kept per source
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    #[serde(default)]
    pub cache_key: CacheKeyMode,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_max_chars() -> usize {
    8000
}
fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.into()
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            cache_key: CacheKeyMode::default(),
            system_prompt: default_system_prompt(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Timeout for fetching a source URL
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Timeout for one completion request
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_fetch_timeout() -> u64 {
    30
}
fn default_request_timeout() -> u64 {
    120
}
fn default_user_agent() -> String {
    concat!("sourcechat/", env!("CARGO_PKG_VERSION")).into()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: default_fetch_timeout(),
            request_timeout_secs: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, or the default location
    /// (`~/.sourcechat/config.toml`) when `None`.
    ///
    /// Then applies environment overrides:
    /// - `SOURCECHAT_API_KEY`, then `DEEPSEEK_API_KEY` (when no key is configured)
    /// - `SOURCECHAT_MODEL`
    /// - `SOURCECHAT_BASE_URL`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path);
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.api_key = config.api_key.filter(|k| is_usable_key(k));
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.api_key.is_none() {
            self.api_key = ["SOURCECHAT_API_KEY", "DEEPSEEK_API_KEY"]
                .iter()
                .filter_map(|key| lookup(key))
                .find(|value| is_usable_key(value));
        }

        if let Some(model) = lookup("SOURCECHAT_MODEL").filter(|m| !m.trim().is_empty()) {
            self.provider.model = model;
        }

        if let Some(url) = lookup("SOURCECHAT_BASE_URL").filter(|u| !u.trim().is_empty()) {
            self.provider.base_url = url;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".sourcechat")
    }

    /// Get the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(ConfigError::ValidationError(
                "provider.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.provider.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "provider.max_tokens must be > 0".into(),
            ));
        }

        if !self.provider.base_url.starts_with("http://")
            && !self.provider.base_url.starts_with("https://")
        {
            return Err(ConfigError::ValidationError(format!(
                "provider.base_url must start with http:// or https:// (got '{}')",
                self.provider.base_url
            )));
        }

        if self.context.max_chars == 0 {
            return Err(ConfigError::ValidationError(
                "context.max_chars must be > 0".into(),
            ));
        }

        if self.http.fetch_timeout_secs == 0 || self.http.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "http timeouts must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for the `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: ProviderConfig::default(),
            context: ContextConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

/// Whether `key` looks like a real credential rather than a blank or placeholder.
pub fn is_usable_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key != PLACEHOLDER_API_KEY
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
