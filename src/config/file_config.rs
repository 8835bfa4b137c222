//! Configuration file support for caselaw-gateway.
//!
//! # Configuration File Format
//!
//! ```toml
//! [upstream]
//! base_url = "https://api.indiankanoon.org"
//! api_token = "your-api-token"
//! auth_scheme = "Token"
//! user_agent = "Mozilla/5.0"
//! timeout_secs = 30
//! connect_timeout_secs = 10
//!
//! [server]
//! host = "127.0.0.1"
//! port = 3001
//! expose_upstream_details = true
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

use std::path::Path;

use super::Config;

const REDACTED: &str = "<redacted>";

const HEADER: &str = "\
# caselaw-gateway configuration
#
# The upstream token can also be supplied through CASELAW_GATEWAY_UPSTREAM__API_TOKEN
# or INDIANKANOON_API_TOKEN. Keep it out of version control.
";

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("Refusing to overwrite existing file: {0}")]
    AlreadyExists(String),
}

/// Render a configuration as TOML, optionally hiding the token
pub fn render_config(config: &Config, redact_token: bool) -> Result<String, ConfigFileError> {
    let mut config = config.clone();
    if redact_token && config.upstream.api_token.is_some() {
        config.upstream.api_token = Some(REDACTED.to_string());
    }
    toml::to_string_pretty(&config).map_err(|e| ConfigFileError::Serialize(e.to_string()))
}

/// Write a default configuration file, creating parent directories
pub fn init_config_file(path: &Path, force: bool) -> Result<(), ConfigFileError> {
    if path.exists() && !force {
        return Err(ConfigFileError::AlreadyExists(path.display().to_string()));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
    }

    let body = render_config(&Config::default(), false)?;
    std::fs::write(path, format!("{}\n{}", HEADER, body))
        .map_err(|e| ConfigFileError::Io(e.to_string()))
}
