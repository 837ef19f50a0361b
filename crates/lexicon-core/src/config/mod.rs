//! Configuration management for Lexicon.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `lexicon.toml` file
//! 3. User config `~/.config/lexicon/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote taxonomy service.
    pub remote: RemoteConfig,

    /// Local snapshot cache.
    pub cache: CacheConfig,

    /// Carousel animation timing.
    pub navigation: NavigationConfig,

    /// LLM provider used for term placement.
    pub llm: LLMConfig,

    /// Reference server settings.
    pub server: ServerConfig,

    /// Log output.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./lexicon.toml` (project local)
    /// 2. `~/.config/lexicon/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new("lexicon.toml").exists() {
            return Self::from_file("lexicon.toml");
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("lexicon").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("LEXICON_REMOTE_URL") {
            self.remote.base_url = url;
        }
        if let Ok(dir) = std::env::var("LEXICON_DATA_DIR") {
            self.cache.data_dir = dir;
        }

        if let Ok(provider) = std::env::var("LEXICON_LLM_PROVIDER") {
            self.llm.provider = provider;
        }
        if let Ok(model) = std::env::var("LEXICON_LLM_MODEL") {
            self.llm.model = Some(model);
        }
        if let Ok(url) = std::env::var("LEXICON_LLM_BASE_URL") {
            self.llm.base_url = Some(url);
        }
        if let Ok(key) = std::env::var("LEXICON_LLM_API_KEY") {
            self.llm.api_key = Some(key);
        }

        if let Ok(port) = std::env::var("LEXICON_PORT") {
            if let Ok(n) = port.parse() {
                self.server.port = n;
            }
        }
        if let Ok(json) = std::env::var("LEXICON_LOG_JSON") {
            self.logging.json = matches!(json.as_str(), "1" | "true" | "yes");
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.remote.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("remote.base_url is empty".to_string()));
        }
        if self.cache.snapshot_key.trim().is_empty() {
            return Err(ConfigError::Invalid("cache.snapshot_key is empty".to_string()));
        }
        if self.navigation.frame_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "navigation.frame_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Remote taxonomy service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL, without trailing slash.
    pub base_url: String,

    /// Full-graph endpoint path.
    pub graph_path: String,

    /// Navigation-assist endpoint path.
    pub navigate_path: String,

    /// Term mutation endpoint path.
    pub terms_path: String,

    /// Request timeout in seconds. Unset keeps the transport default.
    pub timeout_secs: Option<u64>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REMOTE_URL.to_string(),
            graph_path: DEFAULT_GRAPH_PATH.to_string(),
            navigate_path: DEFAULT_NAVIGATE_PATH.to_string(),
            terms_path: DEFAULT_TERMS_PATH.to_string(),
            timeout_secs: None,
        }
    }
}

impl RemoteConfig {
    /// Join the base URL and an endpoint path.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Local snapshot cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding the snapshot file.
    pub data_dir: String,

    /// Fixed slot key; the snapshot is stored as `<key>.json`.
    pub snapshot_key: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_DATA_DIR.to_string(),
            snapshot_key: DEFAULT_SNAPSHOT_KEY.to_string(),
        }
    }
}

impl CacheConfig {
    /// Full path of the snapshot file.
    pub fn snapshot_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(format!("{}.json", self.snapshot_key))
    }
}

/// Carousel animation timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub sibling_scroll_ms: u64,
    pub focus_scroll_ms: u64,
    pub slide_ms: u64,
    pub frame_interval_ms: u64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            sibling_scroll_ms: DEFAULT_SIBLING_SCROLL_MS,
            focus_scroll_ms: DEFAULT_FOCUS_SCROLL_MS,
            slide_ms: DEFAULT_SLIDE_MS,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
        }
    }
}

impl NavigationConfig {
    pub fn sibling_scroll(&self) -> Duration {
        Duration::from_millis(self.sibling_scroll_ms)
    }

    pub fn focus_scroll(&self) -> Duration {
        Duration::from_millis(self.focus_scroll_ms)
    }

    pub fn slide(&self) -> Duration {
        Duration::from_millis(self.slide_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }

    /// Zero-length timing, for headless callers that do not animate.
    pub fn instant() -> Self {
        Self {
            sibling_scroll_ms: 0,
            focus_scroll_ms: 0,
            slide_ms: 0,
            frame_interval_ms: 1,
        }
    }
}

/// LLM provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LLMConfig {
    /// Provider name: "openai", "anthropic", "ollama", or "openrouter".
    pub provider: String,

    /// Model name (provider-specific).
    pub model: Option<String>,

    /// Base URL for API (for openai-compatible providers).
    pub base_url: Option<String>,

    /// API key (can also be set via environment variable).
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Maximum tokens for the classification answer.
    pub max_tokens: u32,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_LLM_PROVIDER.to_string(),
            model: None,
            base_url: None,
            api_key: None,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl LLMConfig {
    /// Get the model name, falling back to provider defaults.
    pub fn model_or_default(&self) -> String {
        self.model.clone().unwrap_or_else(|| match self.provider.as_str() {
            "anthropic" | "claude" => DEFAULT_ANTHROPIC_MODEL.to_string(),
            "ollama" => DEFAULT_OLLAMA_MODEL.to_string(),
            _ => DEFAULT_OPENAI_MODEL.to_string(),
        })
    }

    /// Get the base URL, falling back to provider defaults.
    pub fn base_url_or_default(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| match self.provider.as_str() {
            "anthropic" | "claude" => DEFAULT_ANTHROPIC_URL.to_string(),
            "ollama" => DEFAULT_OLLAMA_URL.to_string(),
            _ => DEFAULT_OPENAI_URL.to_string(),
        })
    }

    /// Get API key from config or environment.
    pub fn api_key_or_env(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("LEXICON_LLM_API_KEY").ok())
            .or_else(|| match self.provider.as_str() {
                "anthropic" | "claude" => std::env::var("ANTHROPIC_API_KEY").ok(),
                "openrouter" => std::env::var("OPENROUTER_API_KEY").ok(),
                _ => std::env::var("OPENAI_API_KEY").ok(),
            })
    }
}

/// Reference server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Catalog document backing the server.
    pub catalog_path: String,
    /// `Cache-Control: max-age` for the full-graph response.
    pub graph_max_age_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            catalog_path: DEFAULT_CATALOG_FILE.to_string(),
            graph_max_age_secs: DEFAULT_GRAPH_MAX_AGE_SECS,
        }
    }
}

/// Log output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.remote.base_url, DEFAULT_REMOTE_URL);
        assert_eq!(config.cache.snapshot_key, DEFAULT_SNAPSHOT_KEY);
        assert_eq!(config.navigation.sibling_scroll_ms, 260);
        assert_eq!(config.navigation.focus_scroll_ms, 360);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_remote_url_join() {
        let remote = RemoteConfig {
            base_url: "http://example.com/".to_string(),
            ..RemoteConfig::default()
        };
        assert_eq!(
            remote.url(DEFAULT_GRAPH_PATH),
            "http://example.com/api/lexicon/graph"
        );
    }

    #[test]
    fn test_snapshot_path() {
        let cache = CacheConfig {
            data_dir: "/tmp/lex".to_string(),
            snapshot_key: "slot".to_string(),
        };
        assert_eq!(cache.snapshot_path(), PathBuf::from("/tmp/lex/slot.json"));
    }

    #[test]
    fn test_zero_frame_interval_rejected() {
        let mut config = Config::default();
        config.navigation.frame_interval_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
