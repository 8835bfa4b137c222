//! Configuration management.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `CASELAW_GATEWAY_*` environment variables (`__` separates nested keys, e.g.
//! `CASELAW_GATEWAY_SERVER__PORT=8080`). The upstream credential may also come from
//! the legacy `INDIANKANOON_API_TOKEN` / `VITE_INDIANKANOON_API_TOKEN` variables.

mod file_config;

pub use file_config::{init_config_file, render_config, ConfigFileError};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CASELAW_GATEWAY";

/// Legacy token variables, checked in order when no token is configured
pub const LEGACY_TOKEN_VARS: [&str; 2] = ["INDIANKANOON_API_TOKEN", "VITE_INDIANKANOON_API_TOKEN"];

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "caselaw-gateway.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Upstream case-law API settings
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Inbound HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upstream API configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the case-law API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Secret API token; requests fail with "not configured" when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Scheme placed before the token in the Authorization header
    #[serde(default = "default_auth_scheme")]
    pub auth_scheme: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
            auth_scheme: default_auth_scheme(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.indiankanoon.org".to_string()
}

fn default_auth_scheme() -> String {
    "Token".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

/// Inbound server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Whether upstream error payloads are echoed back as `details`
    #[serde(default = "default_true")]
    pub expose_upstream_details: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            expose_upstream_details: true,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_true() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// "text" (default) or "json"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl Config {
    /// Bind address for the inbound server
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Whether an upstream token is available
    pub fn has_token(&self) -> bool {
        self.upstream.api_token.is_some()
    }

    /// Check values that deserialize fine but cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = url::Url::parse(&self.upstream.base_url).map_err(|e| {
            ConfigError::Invalid(format!(
                "upstream.base_url '{}': {}",
                self.upstream.base_url, e
            ))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "upstream.base_url must be http or https, got '{}'",
                base.scheme()
            )));
        }
        if self.upstream.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "upstream.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Invalid(
                "server.port must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Drop blank tokens and fall back to the legacy token variables
    fn resolve_token<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = self
            .upstream
            .api_token
            .take()
            .or_else(|| LEGACY_TOKEN_VARS.iter().find_map(|name| lookup(name)))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        self.upstream.api_token = token;
    }
}

/// Load configuration from an optional file plus the environment
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    }
    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mut config: Config = settings.try_deserialize()?;
    config.resolve_token(|name| std::env::var(name).ok());
    config.validate()?;
    Ok(config)
}

/// Find a configuration file in the default locations
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    default_config_path().filter(|p| p.is_file())
}

/// `<config_dir>/caselaw-gateway/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("caselaw-gateway").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.upstream.base_url, "https://api.indiankanoon.org");
        assert_eq!(config.upstream.auth_scheme, "Token");
        assert_eq!(config.upstream.timeout_secs, 30);
        assert_eq!(config.bind_addr(), "127.0.0.1:3001");
        assert!(config.server.expose_upstream_details);
        assert!(!config.has_token());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gateway.toml");
        std::fs::write(
            &path,
            r#"
[upstream]
base_url = "http://localhost:9000"
api_token = "file-token"
timeout_secs = 5

[server]
port = 8088
expose_upstream_details = false

[logging]
level = "debug"
format = "json"
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.upstream.base_url, "http://localhost:9000");
        assert_eq!(config.upstream.api_token.as_deref(), Some("file-token"));
        assert_eq!(config.upstream.timeout_secs, 5);
        assert_eq!(config.upstream.user_agent, "Mozilla/5.0");
        assert_eq!(config.server.port, 8088);
        assert!(!config.server.expose_upstream_details);
        assert_eq!(config.logging.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config(Some(Path::new("/nonexistent/gateway.toml")));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_load_rejects_bad_base_url() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gateway.toml");
        std::fs::write(&path, "[upstream]\nbase_url = \"not a url\"\n").unwrap();

        let result = load_config(Some(&path));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.upstream.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_token_prefers_explicit() {
        let mut config = Config::default();
        config.upstream.api_token = Some("explicit".to_string());
        config.resolve_token(|_| Some("legacy".to_string()));
        assert_eq!(config.upstream.api_token.as_deref(), Some("explicit"));
    }

    #[test]
    fn test_resolve_token_legacy_fallback() {
        let mut config = Config::default();
        config.resolve_token(|name| {
            (name == "VITE_INDIANKANOON_API_TOKEN").then(|| "vite-token".to_string())
        });
        assert_eq!(config.upstream.api_token.as_deref(), Some("vite-token"));
    }

    #[test]
    fn test_resolve_token_blank_is_missing() {
        let mut config = Config::default();
        config.upstream.api_token = Some("   ".to_string());
        config.resolve_token(|_| None);
        assert!(!config.has_token());
    }
}
