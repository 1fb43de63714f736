//! Periodic vitals feed for one verified client.
//!
//! Every tick the streamer samples one reading, frames it, and writes the
//! whole frame.  It stops on the first I/O failure; there is no retry, no
//! batching, and no distinction between a slow client and a gone one.
//!
//! The read half is drained between ticks and anything the client sends is
//! discarded.  EOF on the read half only means the client stopped sending; a
//! half-closed client may still be reading, so the stream goes on until a
//! write fails.  A read error (reset) ends the stream.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use vitals_core::{encode_reading, FrameError, VitalsSource};

/// How often a blocked write re-checks the shutdown flag.
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Why a stream stopped.
#[derive(Debug, Error)]
pub enum StreamFailure {
    /// Writing a frame failed: disconnect, broken pipe, reset.
    #[error("write failed: {0}")]
    Write(#[source] std::io::Error),

    /// Reading from the client failed (typically a reset).
    #[error("read failed: {0}")]
    Io(#[source] std::io::Error),

    /// A reading could not be encoded.
    #[error("encode failed: {0}")]
    Encode(#[from] FrameError),

    /// The running flag was cleared, either at a tick or while a write was
    /// blocked on a client that stopped reading.
    #[error("source shutting down")]
    Shutdown,
}

/// Summary of a finished stream.
#[derive(Debug)]
pub struct StreamEnd {
    /// Frames fully written before the failure.
    pub records_sent: u64,
    pub failure: StreamFailure,
}

/// Produces and delivers readings at a fixed cadence.
pub struct Streamer<S> {
    source: S,
    interval: Duration,
}

impl<S: VitalsSource> Streamer<S> {
    /// A zero interval is raised to one millisecond.
    pub fn new(source: S, interval: Duration) -> Self {
        Self {
            source,
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Streams until the connection fails or `running` is cleared.
    ///
    /// The first reading goes out one interval after the call.  Only
    /// complete frames are counted in [`StreamEnd::records_sent`].
    pub async fn run<R, W>(
        &mut self,
        mut reader: R,
        mut writer: W,
        running: &AtomicBool,
    ) -> StreamEnd
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut discard = [0u8; 512];
        let mut records_sent = 0u64;
        let mut peer_eof = false;

        let failure = loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !running.load(Ordering::Relaxed) {
                        break StreamFailure::Shutdown;
                    }

                    let reading = self.source.sample();
                    let frame = match encode_reading(&reading) {
                        Ok(frame) => frame,
                        Err(e) => break StreamFailure::Encode(e),
                    };

                    let write = async {
                        writer.write_all(&frame).await?;
                        writer.flush().await
                    };
                    tokio::select! {
                        written = write => {
                            if let Err(e) = written {
                                break StreamFailure::Write(e);
                            }
                        }
                        _ = wait_for_shutdown(running) => break StreamFailure::Shutdown,
                    }

                    records_sent += 1;
                    debug!("sent reading #{records_sent}: {reading:?}");
                }
                read = reader.read(&mut discard), if !peer_eof => match read {
                    Ok(0) => {
                        debug!("client half-closed; streaming until a write fails");
                        peer_eof = true;
                    }
                    Ok(n) => debug!("discarding {n} bytes received while streaming"),
                    Err(e) => break StreamFailure::Io(e),
                },
            }
        };

        StreamEnd {
            records_sent,
            failure,
        }
    }
}

async fn wait_for_shutdown(running: &AtomicBool) {
    let mut poll = interval(SHUTDOWN_POLL_INTERVAL);
    loop {
        poll.tick().await;
        if !running.load(Ordering::Relaxed) {
            return;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
