//! Server configuration.
//!
//! [`ServerConfig`] is built once at startup (from defaults, an optional TOML
//! file, and CLI flags) and never changes for the life of the process.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Port the source listens on when none is given.
pub const DEFAULT_PORT: u16 = 10000;

/// Time between two readings on an established stream.
pub const DEFAULT_STREAM_INTERVAL: Duration = Duration::from_millis(500);

/// How long the initial read waits for client bytes before verification
/// proceeds with an empty payload.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_millis(50);

/// Upper bound on the single initial read.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 4096;

/// All runtime configuration for the vitals source.
///
/// # Example
///
/// ```rust
/// use vitals_source::domain::ServerConfig;
///
/// let cfg = ServerConfig::default();
/// assert_eq!(cfg.bind_addr.port(), 10000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address and port the listener binds to.  The host defaults to the
    /// IPv4 wildcard.
    pub bind_addr: SocketAddr,

    /// Cadence of the stream: one reading per interval.
    pub stream_interval: Duration,

    /// Deadline on the initial read that feeds the verifier.
    pub handshake_timeout: Duration,

    /// Size of the buffer for the initial read.
    pub read_buffer_size: usize,
}

impl ServerConfig {
    /// Default configuration listening on `port` instead of 10000.
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            ..Self::default()
        }
    }
}

impl Default for ServerConfig {
    /// | Field             | Default         |
    /// |-------------------|-----------------|
    /// | bind_addr         | `0.0.0.0:10000` |
    /// | stream_interval   | 500 ms          |
    /// | handshake_timeout | 50 ms           |
    /// | read_buffer_size  | 4096 bytes      |
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            stream_interval: DEFAULT_STREAM_INTERVAL,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
