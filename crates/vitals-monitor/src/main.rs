//! Vitals monitor entry point.
//!
//! Connects to a vitals source, sends a greeting, and logs every reading it
//! receives.  Reconnects when the source goes away; stops on Ctrl+C.
//!
//! # Usage
//!
//! ```text
//! vitals-monitor [OPTIONS]
//!
//! Options:
//!   --addr <HOST:PORT>     Source address [default: 127.0.0.1:10000]
//!   --greeting <STR>       Bytes sent after connecting [default: hello]
//!   --reconnect-ms <MS>    Wait before reconnecting [default: 2000]
//! ```

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vitals_monitor::infrastructure::network::{MonitorConfig, MonitorConnection, MonitorEvent};

/// Receiving client for a vitals source.
#[derive(Debug, Parser)]
#[command(
    name = "vitals-monitor",
    about = "Connects to a vitals source and logs the readings it streams",
    version
)]
struct Cli {
    /// Address of the vitals source.
    #[arg(long, default_value = "127.0.0.1:10000")]
    addr: SocketAddr,

    /// Greeting sent once per connection; an empty string sends nothing.
    #[arg(long, default_value = "hello")]
    greeting: String,

    /// Milliseconds to wait before reconnecting.
    #[arg(long, default_value_t = 2000, value_parser = clap::value_parser!(u64).range(1..))]
    reconnect_ms: u64,
}

impl Cli {
    fn into_monitor_config(self) -> MonitorConfig {
        MonitorConfig {
            source_addr: self.addr,
            greeting: self.greeting.into_bytes(),
            reconnect_interval: Duration::from_millis(self.reconnect_ms),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_monitor_config();
    info!("vitals monitor starting: source={}", config.source_addr);

    let running = Arc::new(AtomicBool::new(true));
    let mut events = MonitorConnection::new(config).start(Arc::clone(&running));

    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            running_clone.store(false, Ordering::Relaxed);
        }
    });

    while let Some(event) = events.recv().await {
        match event {
            MonitorEvent::Connected { source_addr } => {
                info!("streaming from {source_addr}");
            }
            MonitorEvent::Reading(r) => {
                info!(
                    heart_rate = r.heart_rate,
                    systolic = r.blood_pressure_systolic,
                    diastolic = r.blood_pressure_diastolic,
                    respiration_rate = r.respiration_rate,
                    "reading"
                );
            }
            MonitorEvent::Disconnected => {
                warn!("source disconnected; reconnect in progress");
            }
        }
    }

    info!("vitals monitor stopped");
    Ok(())
}
