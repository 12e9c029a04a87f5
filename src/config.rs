//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::ApiConfig;
use crate::diagnostics::SinkKind;
use crate::hub::HubConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub hub: HubConfig,

    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP / WebSocket server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_ws_path")]
    pub ws_path: String,

    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_ws_path() -> String {
    "/room".to_string()
}

fn default_max_message_size() -> usize {
    64 * 1024 // 64 KB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ws_path: default_ws_path(),
            max_message_size: default_max_message_size(),
        }
    }
}

/// Diagnostic sink selection
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiagnosticsConfig {
    #[serde(default)]
    pub sink: SinkKind,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from default locations or environment
    ///
    /// Unreadable files are skipped; invalid environment overrides are not.
    pub fn load_default() -> Result<Self, ConfigError> {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("fanhub").join("config.toml")),
            Some(PathBuf::from("/etc/fanhub/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Check values the hub cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hub.outbound_capacity == 0 {
            return Err(ConfigError::Invalid(
                "hub.outbound_capacity must be at least 1".to_string(),
            ));
        }
        if self.hub.event_capacity == 0 {
            return Err(ConfigError::Invalid(
                "hub.event_capacity must be at least 1".to_string(),
            ));
        }
        if !self.server.ws_path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "server.ws_path must start with '/': {}",
                self.server.ws_path
            )));
        }
        Ok(())
    }

    /// HTTP server settings derived from this configuration
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            host: self.server.host.clone(),
            port: self.server.port,
            ws_path: self.server.ws_path.clone(),
            max_message_size: self.server.max_message_size,
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Server overrides
        if let Ok(host) = std::env::var("FANHUB_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("FANHUB_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(path) = std::env::var("FANHUB_WS_PATH") {
            self.server.ws_path = path;
        }

        // Hub overrides
        if let Ok(capacity) = std::env::var("FANHUB_OUTBOUND_CAPACITY") {
            if let Ok(c) = capacity.parse() {
                self.hub.outbound_capacity = c;
            }
        }

        // Diagnostics overrides
        if let Ok(sink) = std::env::var("FANHUB_DIAGNOSTICS") {
            match sink.parse() {
                Ok(kind) => self.diagnostics.sink = kind,
                Err(e) => tracing::warn!("Ignoring FANHUB_DIAGNOSTICS: {}", e),
            }
        }

        // Logging overrides
        if let Ok(level) = std::env::var("FANHUB_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("FANHUB_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Fanhub Configuration
#
# Environment variables override these settings:
# - FANHUB_HOST
# - FANHUB_PORT
# - FANHUB_WS_PATH
# - FANHUB_OUTBOUND_CAPACITY
# - FANHUB_DIAGNOSTICS
# - FANHUB_LOG_LEVEL
# - FANHUB_LOG_FORMAT

[server]
# Host to bind to
host = "0.0.0.0"

# Port to listen on
port = 8080

# Path clients connect to with WebSocket
ws_path = "/room"

# Largest message a client may send (bytes)
max_message_size = 65536

[hub]
# Messages a client may have pending before it is disconnected
outbound_capacity = 256

# Events that may queue for the hub loop before senders wait
event_capacity = 64

[diagnostics]
# Where hub activity traces go: off, tracing, stdout
sink = "off"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.ws_path, "/room");
        assert_eq!(config.hub.outbound_capacity, 256);
        assert_eq!(config.diagnostics.sink, SinkKind::Off);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.hub.outbound_capacity, 256);
        assert_eq!(config.hub.event_capacity, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[hub]\noutbound_capacity = 8\n\n[diagnostics]\nsink = \"tracing\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.hub.outbound_capacity, 8);
        assert_eq!(config.hub.event_capacity, 64);
        assert_eq!(config.diagnostics.sink, SinkKind::Tracing);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_load_rejects_zero_capacity() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[hub]\noutbound_capacity = 0").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/fanhub.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_from_env_rejects_invalid_overrides() {
        std::env::set_var("FANHUB_WS_PATH", "room");
        let bad_path = Config::from_env();
        std::env::remove_var("FANHUB_WS_PATH");
        assert!(matches!(bad_path, Err(ConfigError::Invalid(_))));

        std::env::set_var("FANHUB_OUTBOUND_CAPACITY", "0");
        let bad_capacity = Config::from_env();
        std::env::remove_var("FANHUB_OUTBOUND_CAPACITY");
        assert!(matches!(bad_capacity, Err(ConfigError::Invalid(_))));

        std::env::set_var("FANHUB_WS_PATH", "/chat");
        let good = Config::from_env();
        std::env::remove_var("FANHUB_WS_PATH");
        assert_eq!(good.unwrap().server.ws_path, "/chat");
    }

    #[test]
    fn test_api_config_from_server_section() {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 9001;

        let api = config.api_config();
        assert_eq!(api.addr(), "127.0.0.1:9001");
        assert_eq!(api.ws_path, "/room");
    }
}
