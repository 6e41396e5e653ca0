//! Configuration loading, validation, and management for SiteSage.
//!
//! Loads configuration from `~/.sitesage/config.toml` with environment
//! variable overrides. Validates all settings at startup; the values are
//! immutable for the lifetime of the process.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use url::Url;

/// Default maximum serialized size (in characters) of the site data sent to the LLM.
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 196_000;

/// The root configuration structure.
///
/// Maps directly to `~/.sitesage/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Sampling temperature. Unset means the backend's own default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_temperature: Option<f32>,

    /// Max tokens per LLM response (provider default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_max_tokens: Option<u32>,

    /// The site being answered about
    #[serde(default)]
    pub site: SiteConfig,

    /// Crawler limits
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
/// Redact a secret string for Debug output.
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
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("site", &self.site)
            .field("crawler", &self.crawler)
            .field("gateway", &self.gateway)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Base URL of the site to crawl and answer questions about. Required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Maximum serialized size of the site data embedded in a prompt.
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
}

fn default_max_context_chars() -> usize {
    DEFAULT_MAX_CONTEXT_CHARS
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            max_context_chars: default_max_context_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Link depth followed from the start page (0 = start page only).
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Concurrent page fetches.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_max_depth() -> u32 {
    2
}
fn default_max_pages() -> usize {
    100
}
fn default_concurrency() -> usize {
    5
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    concat!("SiteSage/", env!("CARGO_PKG_VERSION")).into()
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_pages: default_max_pages(),
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.sitesage/config.toml),
    /// then apply environment overrides from the process environment.
    ///
    /// Recognized variables:
    /// - `SITESAGE_BASE_URL`, then `BASE_URL`
    /// - `SITESAGE_API_KEY`, then `OPENAI_API_KEY` (only if no key is configured)
    /// - `SITESAGE_PROVIDER`, `SITESAGE_MODEL`
    /// - `SITESAGE_MAX_CONTEXT_CHARS`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides using the given lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup("SITESAGE_BASE_URL").or_else(|| lookup("BASE_URL")) {
            self.site.base_url = Some(base_url);
        }

        if self.api_key.is_none() {
            self.api_key = lookup("SITESAGE_API_KEY").or_else(|| lookup("OPENAI_API_KEY"));
        }

        if let Some(provider) = lookup("SITESAGE_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = lookup("SITESAGE_MODEL") {
            self.default_model = model;
        }

        if let Some(raw) = lookup("SITESAGE_MAX_CONTEXT_CHARS") {
            self.site.max_context_chars = raw.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "SITESAGE_MAX_CONTEXT_CHARS must be a positive integer, got '{raw}'"
                ))
            })?;
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".sitesage")
    }

    /// Validate the configuration.
    ///
    /// A missing base URL is allowed here so that informational commands work;
    /// anything that crawls calls [`AppConfig::base_url`], which requires it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .default_temperature
            .is_some_and(|t| !(0.0..=2.0).contains(&t))
        {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.site.max_context_chars == 0 {
            return Err(ConfigError::ValidationError(
                "site.max_context_chars must be greater than 0".into(),
            ));
        }

        if self.crawler.concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "crawler.concurrency must be greater than 0".into(),
            ));
        }

        if self.crawler.max_pages == 0 {
            return Err(ConfigError::ValidationError(
                "crawler.max_pages must be greater than 0".into(),
            ));
        }

        if self.site.base_url.is_some() {
            self.base_url()?;
        }

        Ok(())
    }

    /// The parsed site base URL.
    ///
    /// Bare hosts (`example.com`) are treated as `https://`.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let raw = self
            .site
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingBaseUrl)?;

        let candidate = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("https://{raw}")
        };

        let url = Url::parse(&candidate).map_err(|e| ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ConfigError::InvalidBaseUrl {
                url: raw.to_string(),
                reason: "expected an http(s) URL with a host".into(),
            });
        }

        Ok(url)
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
            || self
                .providers
                .get(&self.default_provider)
                .is_some_and(|p| p.api_key.is_some())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: None,
            default_max_tokens: None,
            site: SiteConfig::default(),
            crawler: CrawlerConfig::default(),
            gateway: GatewayConfig::default(),
            providers: HashMap::new(),
        }
    }
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

    #[error("No site configured: set site.base_url in config.toml or the BASE_URL environment variable")]
    MissingBaseUrl,

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.default_model, "gpt-4o-mini");
        assert_eq!(config.site.max_context_chars, 196_000);
        assert_eq!(config.gateway.port, 8000);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_provider, config.default_provider);
        assert_eq!(parsed.site.max_context_chars, config.site.max_context_chars);
        assert_eq!(parsed.crawler.max_depth, config.crawler.max_depth);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            default_temperature: Some(5.0),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn temperature_unset_by_default() {
        let config = AppConfig::default();
        assert!(config.default_temperature.is_none());
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(!toml_str.contains("default_temperature"));

        let parsed: AppConfig = toml::from_str("default_temperature = 0.2").unwrap();
        assert_eq!(parsed.default_temperature, Some(0.2));
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn zero_budget_rejected() {
        let mut config = AppConfig::default();
        config.site.max_context_chars = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.default_provider, "openai");
        assert!(config.site.base_url.is_none());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
default_model = "gpt-4o"

[site]
base_url = "https://docs.example.com"
max_context_chars = 50000

[crawler]
max_depth = 1

[providers.openai]
api_url = "http://localhost:9999/v1"
"#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(config.site.max_context_chars, 50_000);
        assert_eq!(config.crawler.max_depth, 1);
        assert_eq!(config.crawler.max_pages, 100);
        assert_eq!(
            config.providers["openai"].api_url.as_deref(),
            Some("http://localhost:9999/v1")
        );
        assert_eq!(
            config.base_url().unwrap().as_str(),
            "https://docs.example.com/"
        );
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[site\nbase_url = ").unwrap();
        assert!(matches!(
            AppConfig::load_from(file.path()),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env(env(&[
                ("BASE_URL", "https://example.org"),
                ("OPENAI_API_KEY", "sk-test"),
                ("SITESAGE_MODEL", "gpt-4o"),
                ("SITESAGE_MAX_CONTEXT_CHARS", "1000"),
            ]))
            .unwrap();
        assert_eq!(config.site.base_url.as_deref(), Some("https://example.org"));
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(config.site.max_context_chars, 1000);
    }

    #[test]
    fn prefixed_env_wins_over_plain() {
        let mut config = AppConfig::default();
        config
            .apply_env(env(&[
                ("SITESAGE_BASE_URL", "https://a.example"),
                ("BASE_URL", "https://b.example"),
            ]))
            .unwrap();
        assert_eq!(config.site.base_url.as_deref(), Some("https://a.example"));
    }

    #[test]
    fn configured_api_key_not_overridden_by_env() {
        let mut config = AppConfig {
            api_key: Some("from-file".into()),
            ..AppConfig::default()
        };
        config
            .apply_env(env(&[("OPENAI_API_KEY", "from-env")]))
            .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn bad_budget_env_rejected() {
        let mut config = AppConfig::default();
        let result = config.apply_env(env(&[("SITESAGE_MAX_CONTEXT_CHARS", "lots")]));
        assert!(result.is_err());
    }

    #[test]
    fn base_url_required() {
        let config = AppConfig::default();
        assert!(matches!(config.base_url(), Err(ConfigError::MissingBaseUrl)));
    }

    #[test]
    fn bare_host_gets_https() {
        let mut config = AppConfig::default();
        config.site.base_url = Some("example.com".into());
        assert_eq!(config.base_url().unwrap().as_str(), "https://example.com/");
    }

    #[test]
    fn non_http_base_url_rejected() {
        let mut config = AppConfig::default();
        config.site.base_url = Some("ftp://example.com".into());
        assert!(matches!(
            config.base_url(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gpt-4o-mini"));
        assert!(toml_str.contains("196000"));
    }
}
