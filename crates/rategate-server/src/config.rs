// crates/rategate-server/src/config.rs
// ============================================================================
// Module: Rategate Configuration
// Description: Configuration loading and validation for the Rategate service.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from an optional TOML file (path taken from the
//! `RATEGATE_CONFIG` environment variable, falling back to `rategate.toml`),
//! then overridden by the `PORT` environment variable to match the service's
//! historical deployment contract. A missing default file yields built-in
//! defaults; an explicitly named file must exist. Invalid configuration
//! fails closed and aborts startup.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "rategate.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "RATEGATE_CONFIG";
/// Environment variable used to override the listen port.
pub const PORT_ENV_VAR: &str = "PORT";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;
/// Default listen host.
const DEFAULT_HOST: &str = "127.0.0.1";
/// Default listen port.
pub const DEFAULT_PORT: u16 = 4010;
/// Default POST body read timeout in milliseconds.
const DEFAULT_BODY_TIMEOUT_MS: u64 = 5_000;
/// Minimum allowed body read timeout in milliseconds.
const MIN_BODY_TIMEOUT_MS: u64 = 100;
/// Maximum allowed body read timeout in milliseconds.
const MAX_BODY_TIMEOUT_MS: u64 = 60_000;
/// Default maximum request body size in bytes.
const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;
/// Maximum allowed request body size in bytes.
const MAX_MAX_BODY_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors. All variants abort startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("config {path} unreadable: {reason}")]
    Unreadable {
        /// Config file path.
        path: String,
        /// Underlying I/O failure text.
        reason: String,
    },
    /// The config file exceeds the size limit.
    #[error("config {path} exceeds {MAX_CONFIG_FILE_SIZE} bytes")]
    TooLarge {
        /// Config file path.
        path: String,
    },
    /// The config file is not valid TOML for this schema.
    #[error("config {path} invalid: {reason}")]
    Parse {
        /// Config file path.
        path: String,
        /// Parser failure text.
        reason: String,
    },
    /// A configured value is out of bounds or inconsistent.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Config Model
// ============================================================================

/// Top-level Rategate configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RategateConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Dataset source settings.
    pub data: DataConfig,
    /// External query engine settings.
    pub engine: EngineConfig,
    /// Carrier portal settings.
    pub portal: PortalConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Listen host.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Public route prefix applied to portal locations (empty or `/api`).
    pub route_prefix: String,
    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
    /// POST body read timeout in milliseconds.
    pub body_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            route_prefix: String::new(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            body_timeout_ms: DEFAULT_BODY_TIMEOUT_MS,
        }
    }
}

/// Dataset source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// Directory holding the five dataset JSON files.
    pub dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
        }
    }
}

/// External query engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Engine binary invoked per query.
    pub binary: String,
    /// Database file handed to the engine.
    pub database: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: "sqlite3".to_string(),
            database: PathBuf::from("data/cw1-rates.db"),
        }
    }
}

/// Carrier portal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PortalConfig {
    /// Demo username accepted by the login form.
    pub username: String,
    /// Demo password accepted by the login form.
    pub password: String,
    /// Session cookie name.
    pub cookie_name: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            username: "demo".to_string(),
            password: "demo123".to_string(),
            cookie_name: "carrier_session".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl RategateConfig {
    /// Loads configuration from the environment-selected path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is unreadable, oversized,
    /// unparseable, or fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        match env::var(CONFIG_ENV_VAR) {
            Ok(path) => Self::load_from(Path::new(&path)),
            Err(_) => {
                let default = Path::new(DEFAULT_CONFIG_NAME);
                if default.exists() {
                    Self::load_from(default)
                } else {
                    let mut config = Self::default();
                    config.apply_env_overrides()?;
                    config.validate()?;
                    Ok(config)
                }
            }
        }
    }

    /// Loads configuration from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is unreadable, oversized,
    /// unparseable, or fails validation.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let shown = path.display().to_string();
        let metadata = fs::metadata(path).map_err(|err| ConfigError::Unreadable {
            path: shown.clone(),
            reason: err.to_string(),
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::TooLarge {
                path: shown,
            });
        }
        let text = fs::read_to_string(path).map_err(|err| ConfigError::Unreadable {
            path: shown.clone(),
            reason: err.to_string(),
        })?;
        let mut config: Self = toml::from_str(&text).map_err(|err| ConfigError::Parse {
            path: shown,
            reason: err.to_string(),
        })?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides (currently only the listen port).
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(raw) = env::var(PORT_ENV_VAR) {
            let port = raw
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid(format!("{PORT_ENV_VAR} must be a port number")))?;
            self.server.port = port;
        }
        Ok(())
    }

    /// Validates bounds and consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Invalid("server.host must not be empty".to_string()));
        }
        if !self.server.route_prefix.is_empty() {
            if !self.server.route_prefix.starts_with('/') {
                return Err(ConfigError::Invalid(
                    "server.route_prefix must start with '/'".to_string(),
                ));
            }
            if self.server.route_prefix.ends_with('/') {
                return Err(ConfigError::Invalid(
                    "server.route_prefix must not end with '/'".to_string(),
                ));
            }
        }
        if self.server.max_body_bytes == 0 || self.server.max_body_bytes > MAX_MAX_BODY_BYTES {
            return Err(ConfigError::Invalid(format!(
                "server.max_body_bytes must be in 1..={MAX_MAX_BODY_BYTES}"
            )));
        }
        if self.server.body_timeout_ms < MIN_BODY_TIMEOUT_MS
            || self.server.body_timeout_ms > MAX_BODY_TIMEOUT_MS
        {
            return Err(ConfigError::Invalid(format!(
                "server.body_timeout_ms must be in {MIN_BODY_TIMEOUT_MS}..={MAX_BODY_TIMEOUT_MS}"
            )));
        }
        if self.data.dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data.dir must not be empty".to_string()));
        }
        if self.engine.binary.trim().is_empty() {
            return Err(ConfigError::Invalid("engine.binary must not be empty".to_string()));
        }
        if self.engine.database.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("engine.database must not be empty".to_string()));
        }
        if self.portal.username.is_empty() || self.portal.password.is_empty() {
            return Err(ConfigError::Invalid(
                "portal credentials must not be empty".to_string(),
            ));
        }
        if self.portal.cookie_name.is_empty()
            || !self
                .portal
                .cookie_name
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
        {
            return Err(ConfigError::Invalid(
                "portal.cookie_name must be a non-empty cookie token".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only panic-based assertions."
    )]

    use std::fs;

    use super::RategateConfig;

    #[test]
    fn defaults_validate() {
        let config = RategateConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, super::DEFAULT_PORT);
        assert_eq!(config.portal.username, "demo");
        assert_eq!(config.portal.cookie_name, "carrier_session");
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("rategate.toml");
        fs::write(
            &path,
            "[server]\nport = 8088\nroute_prefix = \"/api\"\n\n[engine]\nbinary = \"sqlite3\"\n",
        )
        .expect("write config");
        let config = RategateConfig::load_from(&path).expect("load should succeed");
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.server.route_prefix, "/api");
        assert_eq!(config.data.dir.to_string_lossy(), "data");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("rategate.toml");
        fs::write(&path, "[server]\nlisten = 1\n").expect("write config");
        assert!(RategateConfig::load_from(&path).is_err());
    }

    #[test]
    fn out_of_bounds_timeout_is_rejected() {
        let mut config = RategateConfig::default();
        config.server.body_timeout_ms = 1;
        assert!(config.validate().is_err());
        config.server.body_timeout_ms = 120_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn route_prefix_shape_is_validated() {
        let mut config = RategateConfig::default();
        config.server.route_prefix = "api".to_string();
        assert!(config.validate().is_err());
        config.server.route_prefix = "/api/".to_string();
        assert!(config.validate().is_err());
        config.server.route_prefix = "/api".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_credentials_are_rejected() {
        let mut config = RategateConfig::default();
        config.portal.password = String::new();
        assert!(config.validate().is_err());
    }
}
