//! Optional TOML configuration file for the vitals source.
//!
//! The file is read once at startup and never written.  Every field has a
//! default, so an empty file (or a file with only some keys) is valid:
//!
//! ```toml
//! [server]
//! bind_address = "0.0.0.0"
//! port = 10000
//! stream_interval_ms = 500
//! handshake_timeout_ms = 50
//! read_buffer_size = 4096
//! ```

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::config::{
    ServerConfig, DEFAULT_HANDSHAKE_TIMEOUT, DEFAULT_PORT, DEFAULT_READ_BUFFER_SIZE,
    DEFAULT_STREAM_INTERVAL,
};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// `bind_address` is not an IP address.
    #[error("invalid bind address: '{0}'")]
    InvalidAddress(String),

    /// A value is syntactically fine but unusable.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level file layout.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerSection,
}

/// The `[server]` table.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// IP address to bind.  `"0.0.0.0"` binds all IPv4 interfaces.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_stream_interval_ms")]
    pub stream_interval_ms: u64,
    #[serde(default = "default_handshake_timeout_ms")]
    pub handshake_timeout_ms: u64,
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_stream_interval_ms() -> u64 {
    DEFAULT_STREAM_INTERVAL.as_millis() as u64
}
fn default_handshake_timeout_ms() -> u64 {
    DEFAULT_HANDSHAKE_TIMEOUT.as_millis() as u64
}
fn default_read_buffer_size() -> usize {
    DEFAULT_READ_BUFFER_SIZE
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            stream_interval_ms: default_stream_interval_ms(),
            handshake_timeout_ms: default_handshake_timeout_ms(),
            read_buffer_size: default_read_buffer_size(),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl FileConfig {
    /// Parses a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if it is not valid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Validates the values and converts them to a [`ServerConfig`].
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidAddress`] if `bind_address` is not an IP.
    /// - [`ConfigError::Invalid`] for a zero interval or zero buffer size.
    pub fn into_server_config(self) -> Result<ServerConfig, ConfigError> {
        let s = self.server;

        let ip: IpAddr = s
            .bind_address
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(s.bind_address.clone()))?;

        if s.stream_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "stream_interval_ms must be greater than zero".into(),
            ));
        }
        if s.read_buffer_size == 0 {
            return Err(ConfigError::Invalid(
                "read_buffer_size must be greater than zero".into(),
            ));
        }

        Ok(ServerConfig {
            bind_addr: SocketAddr::new(ip, s.port),
            stream_interval: Duration::from_millis(s.stream_interval_ms),
            handshake_timeout: Duration::from_millis(s.handshake_timeout_ms),
            read_buffer_size: s.read_buffer_size,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_yields_defaults() {
        let cfg = FileConfig::from_toml_str("")
            .unwrap()
            .into_server_config()
            .unwrap();
        assert_eq!(cfg, ServerConfig::default());
    }

    #[test]
    fn test_partial_section_fills_missing_fields() {
        // Arrange
        let text = "[server]\nport = 12000\n";

        // Act
        let cfg = FileConfig::from_toml_str(text)
            .unwrap()
            .into_server_config()
            .unwrap();

        // Assert
        assert_eq!(cfg.bind_addr.port(), 12000);
        assert_eq!(cfg.stream_interval, DEFAULT_STREAM_INTERVAL);
        assert_eq!(cfg.read_buffer_size, DEFAULT_READ_BUFFER_SIZE);
    }

    #[test]
    fn test_full_section_is_applied() {
        let text = r#"
            [server]
            bind_address = "127.0.0.1"
            port = 9000
            stream_interval_ms = 250
            handshake_timeout_ms = 20
            read_buffer_size = 1024
        "#;

        let cfg = FileConfig::from_toml_str(text)
            .unwrap()
            .into_server_config()
            .unwrap();

        assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(cfg.stream_interval, Duration::from_millis(250));
        assert_eq!(cfg.handshake_timeout, Duration::from_millis(20));
        assert_eq!(cfg.read_buffer_size, 1024);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let result = FileConfig::from_toml_str("[server]\nbacklog = 10\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_invalid_bind_address_is_rejected() {
        let result = FileConfig::from_toml_str("[server]\nbind_address = \"not.an.ip\"\n")
            .unwrap()
            .into_server_config();
        assert!(matches!(result, Err(ConfigError::InvalidAddress(ref a)) if a == "not.an.ip"));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let result = FileConfig::from_toml_str("[server]\nstream_interval_ms = 0\n")
            .unwrap()
            .into_server_config();
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_read_buffer_is_rejected() {
        let result = FileConfig::from_toml_str("[server]\nread_buffer_size = 0\n")
            .unwrap()
            .into_server_config();
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let path = Path::new("/definitely/not/here/vitals.toml");

        let err = FileConfig::load(path).unwrap_err();

        assert!(matches!(err, ConfigError::Io { ref path, .. } if path.ends_with("vitals.toml")));
    }
}
