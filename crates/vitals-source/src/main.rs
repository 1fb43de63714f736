//! Vitals source entry point.
//!
//! Listens for a single client and streams synthetic vital-sign readings to
//! it, one newline-delimited JSON record every 500 ms, until it disconnects.
//!
//! # Usage
//!
//! ```text
//! vitals-source [PORT] [OPTIONS]
//!
//! Arguments:
//!   [PORT]                        TCP port to listen on [default: 10000]
//!
//! Options:
//!   --bind <ADDR>                 IP address to bind [default: 0.0.0.0]
//!   --interval-ms <MS>            Time between readings [default: 500]
//!   --handshake-timeout-ms <MS>   Wait for client's opening bytes [default: 50]
//!   --config <FILE>               Optional TOML config file
//! ```
//!
//! Values given on the command line win over the config file, which wins
//! over built-in defaults.

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vitals_core::RandomVitals;
use vitals_source::application::AcceptAll;
use vitals_source::domain::ServerConfig;
use vitals_source::infrastructure::{FileConfig, VitalsServer};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Single-client vitals telemetry source.
#[derive(Debug, Parser)]
#[command(
    name = "vitals-source",
    about = "Streams synthetic vital-sign readings to one TCP client at a time",
    version
)]
struct Cli {
    /// TCP port to listen on.
    port: Option<u16>,

    /// IP address to bind.
    #[arg(long)]
    bind: Option<String>,

    /// Milliseconds between two readings.
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Milliseconds to wait for the client's opening bytes before verifying.
    #[arg(long)]
    handshake_timeout_ms: Option<u64>,

    /// TOML config file; missing keys fall back to defaults.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// Layers CLI overrides on top of the config file (or defaults).
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or any resulting
    /// value is invalid.
    fn into_server_config(self) -> anyhow::Result<ServerConfig> {
        let mut file = match &self.config {
            Some(path) => FileConfig::load(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => FileConfig::default(),
        };

        let server = &mut file.server;
        if let Some(port) = self.port {
            server.port = port;
        }
        if let Some(bind) = self.bind {
            server.bind_address = bind;
        }
        if let Some(ms) = self.interval_ms {
            server.stream_interval_ms = ms;
        }
        if let Some(ms) = self.handshake_timeout_ms {
            server.handshake_timeout_ms = ms;
        }

        Ok(file.into_server_config()?)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_server_config()?;

    info!(
        "vitals source starting: bind={}, interval={:?}",
        config.bind_addr, config.stream_interval
    );

    // Binding is the only fatal failure; it surfaces here and exits non-zero.
    let server = VitalsServer::bind(config, AcceptAll, RandomVitals::new())
        .context("cannot start vitals source")?;

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C; shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    server.run(running).await;

    info!("vitals source stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cli_defaults_produce_default_config() {
        let cli = Cli::parse_from(["vitals-source"]);
        let config = cli.into_server_config().unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_positional_port_overrides_default() {
        let cli = Cli::parse_from(["vitals-source", "10500"]);
        let config = cli.into_server_config().unwrap();
        assert_eq!(config.bind_addr.port(), 10500);
    }

    #[test]
    fn test_bind_override() {
        let cli = Cli::parse_from(["vitals-source", "--bind", "127.0.0.1"]);
        let config = cli.into_server_config().unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:10000");
    }

    #[test]
    fn test_interval_override() {
        let cli = Cli::parse_from(["vitals-source", "--interval-ms", "100"]);
        let config = cli.into_server_config().unwrap();
        assert_eq!(config.stream_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_handshake_timeout_override() {
        let cli = Cli::parse_from(["vitals-source", "--handshake-timeout-ms", "5"]);
        let config = cli.into_server_config().unwrap();
        assert_eq!(config.handshake_timeout, Duration::from_millis(5));
    }

    #[test]
    fn test_invalid_port_is_rejected_by_parser() {
        let result = Cli::try_parse_from(["vitals-source", "70000"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_bind_returns_error() {
        // Arrange
        let cli = Cli {
            port: None,
            bind: Some("not.an.ip".to_string()),
            interval_ms: None,
            handshake_timeout_ms: None,
            config: None,
        };

        // Act
        let result = cli.into_server_config();

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_interval_returns_error() {
        let cli = Cli::parse_from(["vitals-source", "--interval-ms", "0"]);
        assert!(cli.into_server_config().is_err());
    }

    #[test]
    fn test_missing_config_file_returns_error() {
        let cli = Cli::parse_from(["vitals-source", "--config", "/no/such/vitals.toml"]);
        assert!(cli.into_server_config().is_err());
    }
}
