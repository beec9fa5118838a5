//! Configuration management for hubtrail
//!
//! This module provides unified configuration management with automatic
//! first-run initialization and zero-config defaults. OAuth client settings
//! come from the config file or, taking precedence, from environment
//! variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::client::ClientConfig;
use crate::constants::{env as env_keys, limits, storage};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// OAuth application settings
    pub oauth: OauthConfig,
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// OAuth application credentials
///
/// Both fields may be left empty in the file and supplied through
/// `GITHUB_CLIENT_ID` / `GITHUB_CLIENT_SECRET` instead.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OauthConfig {
    /// OAuth application client id
    pub client_id: Option<String>,
    /// OAuth application client secret
    pub client_secret: Option<String>,
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfigToml {
    /// TCP keep-alive timeout in seconds (None = disabled)
    pub tcp_keepalive_secs: Option<u64>,
    /// TCP nodelay setting
    pub tcp_nodelay: bool,
    /// Connection pool idle timeout in seconds (None = no timeout)
    pub pool_idle_timeout_secs: Option<u64>,
    /// Maximum connections per host
    pub pool_max_per_host: usize,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Rate limit (requests per second)
    pub rate_limit_rps: u32,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            tcp_keepalive_secs: Some(30),
            tcp_nodelay: true,
            pool_idle_timeout_secs: Some(90),
            pool_max_per_host: 8,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            rate_limit_rps: limits::DEFAULT_RATE_LIMIT_RPS,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level for the application
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration, creating a default config file on first run.
    ///
    /// Precedence: defaults, then the config file, then environment
    /// variables for the OAuth settings.
    pub fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        let path = match config_file_override {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::Io(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("config file not found: {}", path.display()),
                    )));
                }
                path
            }
            None => {
                let path = Self::default_path()?;
                if !path.exists() {
                    Self::initialize_first_run(&path)?;
                }
                path
            }
        };

        debug!(path = %path.display(), "loading configuration");
        let contents = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Resolve the OAuth client id and secret, environment first
    pub fn oauth_credentials(&self) -> ConfigResult<(String, String)> {
        let client_id = std::env::var(env_keys::CLIENT_ID)
            .ok()
            .or_else(|| self.oauth.client_id.clone())
            .filter(|value| !value.is_empty());
        let client_secret = std::env::var(env_keys::CLIENT_SECRET)
            .ok()
            .or_else(|| self.oauth.client_secret.clone())
            .filter(|value| !value.is_empty());

        match (client_id, client_secret) {
            (Some(id), Some(secret)) => Ok((id, secret)),
            _ => Err(ConfigError::MissingOauth),
        }
    }

    /// Convert the TOML client section to the runtime client configuration
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            tcp_keepalive: self.client.tcp_keepalive_secs.map(Duration::from_secs),
            tcp_nodelay: self.client.tcp_nodelay,
            pool_idle_timeout: self.client.pool_idle_timeout_secs.map(Duration::from_secs),
            pool_max_per_host: self.client.pool_max_per_host,
            request_timeout: Duration::from_secs(self.client.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.client.connect_timeout_secs),
            rate_limit_rps: self.client.rate_limit_rps,
        }
    }

    /// Path of the history database next to the config file
    pub fn history_db_path() -> ConfigResult<PathBuf> {
        Ok(Self::config_dir()?.join(storage::HISTORY_DB_FILE_NAME))
    }

    /// Default config file path for the current user
    pub fn default_path() -> ConfigResult<PathBuf> {
        Ok(Self::config_dir()?.join(storage::CONFIG_FILE_NAME))
    }

    fn config_dir() -> ConfigResult<PathBuf> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join(storage::APP_DIR_NAME))
    }

    fn initialize_first_run(path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, Self::generate_default_config_content())?;
        info!(path = %path.display(), "created default configuration file");
        Ok(())
    }

    /// Generate default configuration content with helpful comments
    fn generate_default_config_content() -> String {
        format!(
            r#"# hubtrail configuration
# This file was automatically generated on first run.

[oauth]
# GitHub OAuth application credentials. Create an OAuth app at
# https://github.com/settings/developers and fill these in, or set the
# GITHUB_CLIENT_ID and GITHUB_CLIENT_SECRET environment variables instead.
# client_id = ""
# client_secret = ""

[client]
# HTTP client settings
tcp_keepalive_secs = 30
tcp_nodelay = true
pool_idle_timeout_secs = 90
pool_max_per_host = 8
request_timeout_secs = 30
connect_timeout_secs = 10
rate_limit_rps = {}

[logging]
# Logging configuration
level = "info"  # error, warn, info, debug, trace
"#,
            limits::DEFAULT_RATE_LIMIT_RPS
        )
    }
}
