//! Listener: bind, accept loop, and the per-connection pipeline.
//!
//! The source serves exactly one client at a time.  The accept loop, the
//! initial read, verification, and streaming all run in sequence on the
//! caller's task; a second client waits in the OS backlog until the current
//! stream ends.  Every per-connection failure is logged and swallowed here;
//! only a failure to bind is fatal.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use vitals_core::VitalsSource;

use crate::application::{Verdict, VerificationFailure, Verifier};
use crate::domain::{ServerConfig, SessionEvent, SessionState};
use crate::infrastructure::handshake::read_initial_bytes;
use crate::infrastructure::streamer::{StreamEnd, StreamFailure, Streamer};

/// How often the accept loop wakes up to check the shutdown flag.
pub const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Pending connections the OS may queue while a client is being served.
const LISTEN_BACKLOG: u32 = 1;

/// The listening socket could not be created.  Fatal; never retried.
#[derive(Debug, Error)]
#[error("failed to bind vitals listener on {addr}: {source}")]
pub struct BindError {
    pub addr: SocketAddr,
    #[source]
    pub source: std::io::Error,
}

/// Result of serving one connection: how the stream ended, or why it never
/// started.
pub type SessionOutcome = Result<StreamEnd, VerificationFailure>;

/// Creates the listening socket with address reuse and a backlog of one.
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns [`BindError`] if the socket cannot be created, bound, or put
/// into listening mode (typically: the port is already in use).
pub fn bind_listener(addr: SocketAddr) -> Result<TcpListener, BindError> {
    let bind = || -> std::io::Result<TcpListener> {
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        // On Windows SO_REUSEADDR lets a second socket take over a port that
        // is already listening.
        #[cfg(unix)]
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        socket.listen(LISTEN_BACKLOG)
    };
    bind().map_err(|source| BindError { addr, source })
}

/// The vitals source: one listener, one verifier, one streamer.
pub struct VitalsServer<V, S> {
    listener: TcpListener,
    local_addr: SocketAddr,
    config: ServerConfig,
    verifier: V,
    streamer: Streamer<S>,
}

impl<V, S> VitalsServer<V, S>
where
    V: Verifier,
    S: VitalsSource,
{
    /// Binds the listener described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`BindError`] if the port is unavailable.
    pub fn bind(config: ServerConfig, verifier: V, source: S) -> Result<Self, BindError> {
        let listener = bind_listener(config.bind_addr)?;
        let local_addr = listener.local_addr().map_err(|source| BindError {
            addr: config.bind_addr,
            source,
        })?;
        let streamer = Streamer::new(source, config.stream_interval);

        Ok(Self {
            listener,
            local_addr,
            config,
            verifier,
            streamer,
        })
    }

    /// The address actually bound (resolves port 0 to the assigned port).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accepts and serves clients one at a time until `running` is cleared.
    ///
    /// Accept errors are logged and retried after [`ACCEPT_POLL_INTERVAL`],
    /// so a persistent one (EMFILE) cannot spin the loop.  Per-connection
    /// failures never escape this function.
    pub async fn run(mut self, running: Arc<AtomicBool>) {
        info!("vitals source listening on {}", self.local_addr);

        loop {
            if !running.load(Ordering::Relaxed) {
                info!("shutdown flag set; stopping accept loop");
                break;
            }

            match timeout(ACCEPT_POLL_INTERVAL, self.listener.accept()).await {
                Ok(Ok((stream, peer_addr))) => {
                    let outcome = self.serve_connection(stream, peer_addr, &running).await;
                    log_outcome(peer_addr, &outcome);
                    debug!("waiting for next client");
                }
                Ok(Err(e)) => backoff_after_accept_error(&e).await,
                Err(_) => {
                    // No client in the last poll interval; re-check the flag.
                }
            }
        }
    }

    /// Runs the verify-then-stream pipeline for one accepted connection.
    ///
    /// The connection is closed when this returns, whatever the outcome.
    pub async fn serve_connection(
        &mut self,
        stream: TcpStream,
        peer_addr: SocketAddr,
        running: &AtomicBool,
    ) -> SessionOutcome {
        info!("client connected from {peer_addr}");
        if let Err(e) = stream.set_nodelay(true) {
            debug!("session {peer_addr}: could not disable Nagle: {e}");
        }

        let mut state = SessionState::Accepted;
        let (mut read_half, write_half) = stream.into_split();

        advance(&mut state, SessionEvent::HandshakeStarted, peer_addr);
        let initial = match read_initial_bytes(
            &mut read_half,
            self.config.read_buffer_size,
            self.config.handshake_timeout,
        )
        .await
        {
            Ok(bytes) => bytes,
            Err(failure) => {
                advance(&mut state, SessionEvent::ConnectionFailed, peer_addr);
                return Err(failure);
            }
        };
        debug!(
            "session {peer_addr}: {} initial bytes: {:?}",
            initial.len(),
            String::from_utf8_lossy(&initial)
        );

        if self.verifier.check(&initial) == Verdict::Reject {
            advance(&mut state, SessionEvent::Rejected, peer_addr);
            drop(read_half);
            drop(write_half);
            advance(&mut state, SessionEvent::Close, peer_addr);
            debug_assert!(state.is_terminal());
            return Err(VerificationFailure::Rejected);
        }

        advance(&mut state, SessionEvent::Accepted, peer_addr);
        let end = self.streamer.run(read_half, write_half, running).await;
        advance(&mut state, SessionEvent::ConnectionFailed, peer_addr);
        debug_assert!(state.is_terminal());
        Ok(end)
    }
}

async fn backoff_after_accept_error(e: &std::io::Error) {
    error!("accept error: {e}; retrying in {ACCEPT_POLL_INTERVAL:?}");
    tokio::time::sleep(ACCEPT_POLL_INTERVAL).await;
}

fn advance(state: &mut SessionState, event: SessionEvent, peer_addr: SocketAddr) {
    match state.on(event) {
        Ok(next) => {
            debug!("session {peer_addr}: {state} -> {next}");
            *state = next;
        }
        Err(e) => {
            error!("session {peer_addr}: {e}");
            *state = SessionState::Closed;
        }
    }
}

fn log_outcome(peer_addr: SocketAddr, outcome: &SessionOutcome) {
    match outcome {
        Ok(StreamEnd {
            records_sent,
            failure: StreamFailure::Shutdown,
        }) => {
            info!("session {peer_addr} closed after {records_sent} readings");
        }
        Ok(StreamEnd {
            records_sent,
            failure: failure @ StreamFailure::Write(_),
        }) => {
            info!("session {peer_addr} ended after {records_sent} readings: {failure}");
        }
        Ok(StreamEnd {
            records_sent,
            failure,
        }) => {
            warn!("session {peer_addr} closed after {records_sent} readings: {failure}");
        }
        Err(VerificationFailure::Rejected) => {
            info!("session {peer_addr} rejected");
        }
        Err(failure) => {
            warn!("session {peer_addr} failed verification: {failure}");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
