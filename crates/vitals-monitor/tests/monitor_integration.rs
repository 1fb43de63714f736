//! End-to-end tests: a real vitals source and a monitor over loopback.
//!
//! These exercise the full contract between the two binaries: the monitor's
//! greeting reaches the source's verifier, the framed records decode on the
//! other side, and the monitor's reconnect loop survives a closed connection.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use vitals_core::RandomVitals;
use vitals_monitor::infrastructure::network::{MonitorConfig, MonitorConnection, MonitorEvent};
use vitals_source::application::{AcceptAll, Verdict, Verifier};
use vitals_source::domain::ServerConfig;
use vitals_source::infrastructure::VitalsServer;

fn start_source<V: Verifier + 'static>(verifier: V) -> (SocketAddr, Arc<AtomicBool>) {
    let config = ServerConfig {
        bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 0)),
        stream_interval: Duration::from_millis(20),
        ..ServerConfig::default()
    };
    let server = VitalsServer::bind(config, verifier, RandomVitals::seeded(5)).unwrap();
    let addr = server.local_addr();
    let running = Arc::new(AtomicBool::new(true));
    tokio::spawn(server.run(Arc::clone(&running)));
    (addr, running)
}

fn monitor_config(addr: SocketAddr) -> MonitorConfig {
    MonitorConfig {
        source_addr: addr,
        reconnect_interval: Duration::from_millis(50),
        ..MonitorConfig::default()
    }
}

async fn next_event(rx: &mut mpsc::Receiver<MonitorEvent>) -> MonitorEvent {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("event within two seconds")
        .expect("channel open")
}

#[tokio::test]
async fn test_monitor_receives_source_readings() {
    // Arrange
    let (addr, source_running) = start_source(AcceptAll);
    let running = Arc::new(AtomicBool::new(true));

    // Act
    let mut rx = MonitorConnection::new(monitor_config(addr)).start(Arc::clone(&running));

    // Assert: connected first, then in-range readings
    assert_eq!(
        next_event(&mut rx).await,
        MonitorEvent::Connected { source_addr: addr }
    );
    for _ in 0..3 {
        match next_event(&mut rx).await {
            MonitorEvent::Reading(r) => assert!(r.validate().is_ok()),
            other => panic!("expected a reading, got {other:?}"),
        }
    }

    running.store(false, Ordering::Relaxed);
    source_running.store(false, Ordering::Relaxed);
}

#[tokio::test]
async fn test_monitor_greeting_reaches_verifier() {
    let (tx, mut seen) = mpsc::unbounded_channel::<Vec<u8>>();
    let verifier = move |initial: &[u8]| {
        let _ = tx.send(initial.to_vec());
        Verdict::Accept
    };
    let (addr, source_running) = start_source(verifier);
    let running = Arc::new(AtomicBool::new(true));

    let config = MonitorConfig {
        greeting: b"Test".to_vec(),
        ..monitor_config(addr)
    };
    let _rx = MonitorConnection::new(config).start(Arc::clone(&running));

    let greeting = timeout(Duration::from_secs(2), seen.recv())
        .await
        .expect("verifier called")
        .expect("channel open");
    assert_eq!(greeting, b"Test");

    running.store(false, Ordering::Relaxed);
    source_running.store(false, Ordering::Relaxed);
}

#[tokio::test]
async fn test_monitor_reconnects_after_rejection() {
    // Arrange: the source rejects the first connection and accepts the rest
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_in_verifier = Arc::clone(&calls);
    let verifier = move |_: &[u8]| {
        if calls_in_verifier.fetch_add(1, Ordering::SeqCst) == 0 {
            Verdict::Reject
        } else {
            Verdict::Accept
        }
    };
    let (addr, source_running) = start_source(verifier);
    let running = Arc::new(AtomicBool::new(true));

    // Act
    let mut rx = MonitorConnection::new(monitor_config(addr)).start(Arc::clone(&running));

    // Assert
    assert!(matches!(next_event(&mut rx).await, MonitorEvent::Connected { .. }));
    assert_eq!(next_event(&mut rx).await, MonitorEvent::Disconnected);
    assert!(matches!(next_event(&mut rx).await, MonitorEvent::Connected { .. }));
    assert!(matches!(next_event(&mut rx).await, MonitorEvent::Reading(_)));
    assert!(calls.load(Ordering::SeqCst) >= 2);

    running.store(false, Ordering::Relaxed);
    source_running.store(false, Ordering::Relaxed);
}
