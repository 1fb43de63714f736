//! Network infrastructure for the monitor.
//!
//! Handles the TCP connection to the vitals source and forwards decoded
//! readings to the caller.
//!
//! Architecture:
//! - `MonitorConnection` owns the configuration and runs the reconnect loop
//!   on a spawned task.
//! - Each connection sends the greeting once, then only reads.
//! - Readings and connection changes are delivered as [`MonitorEvent`]s on
//!   an `mpsc` channel.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{self, timeout};
use tracing::{debug, info, warn};

use vitals_core::{FrameDecoder, FrameError, VitalsReading};

/// Port a vitals source listens on unless told otherwise.
pub const DEFAULT_SOURCE_PORT: u16 = 10000;

/// Bytes sent right after connecting.
pub const DEFAULT_GREETING: &[u8] = b"hello";

/// Pause between a lost connection and the next attempt.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_secs(2);

/// How often a blocked read wakes up to check the shutdown flag.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

const READ_CHUNK: usize = 4096;

/// Errors that can occur in the monitor network layer.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// TCP connection to the source failed.
    #[error("failed to connect to vitals source at {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// An I/O error occurred on the established connection.
    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The stream ended in the middle of a record.
    #[error("stream ended mid-record: {0}")]
    Frame(#[from] FrameError),
}

/// Configuration for the monitor's connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Address of the vitals source.
    pub source_addr: SocketAddr,
    /// Sent once per connection.  Empty means send nothing.
    pub greeting: Vec<u8>,
    /// Wait between a lost connection and the next attempt.
    pub reconnect_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            source_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_SOURCE_PORT)),
            greeting: DEFAULT_GREETING.to_vec(),
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
        }
    }
}

/// Events emitted by the network layer.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    /// The TCP connection was established and the greeting sent.
    Connected { source_addr: SocketAddr },
    /// One complete, in-range reading arrived.
    Reading(VitalsReading),
    /// The connection ended; a reconnect follows unless shutting down.
    Disconnected,
}

/// Client side of one vitals feed.
pub struct MonitorConnection {
    config: MonitorConfig,
}

impl MonitorConnection {
    pub fn new(config: MonitorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Spawns the reconnect loop and returns the event receiver.
    ///
    /// The loop runs until `running` is cleared or the receiver is dropped.
    /// Must be called from within a Tokio runtime.
    pub fn start(self, running: Arc<AtomicBool>) -> mpsc::Receiver<MonitorEvent> {
        let (tx, rx) = mpsc::channel(128);

        tokio::spawn(async move {
            self.reconnect_loop(&tx, &running).await;
            debug!("monitor reconnect loop stopped");
        });

        rx
    }

    async fn reconnect_loop(&self, tx: &mpsc::Sender<MonitorEvent>, running: &AtomicBool) {
        let addr = self.config.source_addr;

        while running.load(Ordering::Relaxed) {
            match self.connect().await {
                Ok(stream) => {
                    info!("connected to vitals source at {addr}");
                    if tx
                        .send(MonitorEvent::Connected { source_addr: addr })
                        .await
                        .is_err()
                    {
                        break;
                    }

                    match read_readings(stream, tx, running).await {
                        Ok(count) => info!("source closed the stream after {count} readings"),
                        Err(e) => warn!("stream from {addr} failed: {e}"),
                    }

                    if tx.send(MonitorEvent::Disconnected).await.is_err() {
                        break;
                    }
                    info!(
                        "disconnected from source; reconnecting in {:?}",
                        self.config.reconnect_interval
                    );
                }
                Err(e) => {
                    warn!("{e}");
                }
            }

            if tx.is_closed() {
                break;
            }
            if running.load(Ordering::Relaxed) {
                time::sleep(self.config.reconnect_interval).await;
            }
        }
    }

    /// Opens a connection and sends the greeting.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Connect`] if the source is unreachable, or
    /// [`MonitorError::Io`] if the greeting cannot be written.
    pub async fn connect(&self) -> Result<TcpStream, MonitorError> {
        let addr = self.config.source_addr;
        let mut stream = TcpStream::connect(addr)
            .await
            .map_err(|source| MonitorError::Connect { addr, source })?;

        if !self.config.greeting.is_empty() {
            stream.write_all(&self.config.greeting).await?;
            debug!("sent {} greeting bytes", self.config.greeting.len());
        }

        Ok(stream)
    }
}

/// Decodes readings from `reader` and forwards them on `tx`.
///
/// Returns the number of readings forwarded once the peer closes cleanly,
/// `running` is cleared, or the receiver is dropped.  A corrupt record is
/// logged and skipped.
///
/// # Errors
///
/// - [`MonitorError::Io`] if a read fails.
/// - [`MonitorError::Frame`] if the peer closes with a partial record
///   buffered.
pub async fn read_readings<R>(
    mut reader: R,
    tx: &mpsc::Sender<MonitorEvent>,
    running: &AtomicBool,
) -> Result<u64, MonitorError>
where
    R: AsyncRead + Unpin,
{
    let mut decoder = FrameDecoder::new();
    let mut buf = vec![0u8; READ_CHUNK];
    let mut received = 0u64;

    while running.load(Ordering::Relaxed) {
        let n = match timeout(POLL_INTERVAL, reader.read(&mut buf)).await {
            Ok(read) => read?,
            Err(_) => continue,
        };

        if n == 0 {
            return match decoder.buffered() {
                0 => Ok(received),
                buffered => Err(FrameError::Incomplete { buffered }.into()),
            };
        }

        decoder.extend(&buf[..n]);
        loop {
            match decoder.next_reading() {
                Ok(Some(reading)) => {
                    received += 1;
                    debug!("reading #{received}: {reading:?}");
                    if tx.send(MonitorEvent::Reading(reading)).await.is_err() {
                        return Ok(received);
                    }
                }
                Ok(None) => break,
                Err(e) => warn!("skipping bad record: {e}"),
            }
        }
    }

    Ok(received)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
