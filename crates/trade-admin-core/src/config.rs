//! Configuration management for the trade-admin console

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix, e.g. `TRADE_ADMIN__API__BASE_URL`
pub const ENV_PREFIX: &str = "TRADE_ADMIN";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Remote API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Session and credential storage configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL of the admin backend, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the login endpoint
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Path notified on logout; no notification when unset
    #[serde(default)]
    pub logout_path: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    /// Directory holding the durable credential record
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    /// Key under which the bearer token is stored
    #[serde(default = "default_token_key")]
    pub token_key: String,

    /// Upper bound in seconds for reading the stored token at startup
    #[serde(default = "default_init_timeout")]
    pub init_timeout: u64,

    /// Probe the backend with the restored token before the first page
    #[serde(default)]
    pub verify_on_start: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or pretty)
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Log to file instead of stderr
    #[serde(default)]
    pub file: Option<PathBuf>,
}

// Default value functions
fn default_base_url() -> String {
    "https://api.forlifetradingindia.life".to_string()
}

fn default_login_path() -> String {
    "/api/admin/login".to_string()
}

const fn default_request_timeout() -> u64 {
    10
}

fn default_storage_dir() -> PathBuf {
    directories::UserDirs::new()
        .map_or_else(|| PathBuf::from("."), |dirs| dirs.home_dir().to_path_buf())
        .join(".trade-admin")
}

fn default_token_key() -> String {
    "token".to_string()
}

const fn default_init_timeout() -> u64 {
    5
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            login_path: default_login_path(),
            logout_path: None,
            request_timeout: default_request_timeout(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            token_key: default_token_key(),
            init_timeout: default_init_timeout(),
            verify_on_start: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl ApiConfig {
    /// Per-request timeout
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Join a path onto the base URL
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl SessionConfig {
    /// Startup bound for reading the stored token
    pub const fn init_timeout(&self) -> Duration {
        Duration::from_secs(self.init_timeout)
    }
}

impl Config {
    /// Load configuration from the working directory and environment
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded, parsed or validated.
    pub fn load() -> crate::Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, layering an explicit file over the default sources
    ///
    /// Order: `trade-admin.toml`, `config.toml`, `path`, then `TRADE_ADMIN__*`
    /// environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing or any source fails to parse.
    pub fn load_from(path: Option<&Path>) -> crate::Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("trade-admin").required(false))
            .add_source(config::File::with_name("config").required(false));

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config: Self = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check invariants the loaders cannot express
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first offending field.
    pub fn validate(&self) -> crate::Result<()> {
        let base = self.api.base_url.trim();
        if base.is_empty() {
            return Err(crate::Error::validation("api.base_url", "must not be empty"));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(crate::Error::validation(
                "api.base_url",
                "must start with http:// or https://",
            ));
        }
        if !self.api.login_path.starts_with('/') {
            return Err(crate::Error::validation("api.login_path", "must start with '/'"));
        }
        if let Some(logout) = &self.api.logout_path {
            if !logout.starts_with('/') {
                return Err(crate::Error::validation(
                    "api.logout_path",
                    "must start with '/'",
                ));
            }
        }
        if self.api.request_timeout == 0 {
            return Err(crate::Error::validation(
                "api.request_timeout",
                "must be at least one second",
            ));
        }
        if self.session.init_timeout == 0 {
            return Err(crate::Error::validation(
                "session.init_timeout",
                "must be at least one second",
            ));
        }
        if !is_valid_storage_key(&self.session.token_key) {
            return Err(crate::Error::validation(
                "session.token_key",
                "must be non-empty ASCII letters, digits, '_', '-' or '.', not starting with '.'",
            ));
        }
        Ok(())
    }
}

/// Whether `key` can name a credential record on disk
pub fn is_valid_storage_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
