//! vitals-monitor library crate.
//!
//! The receiving side of vitals-stream.  A monitor connects to a vitals
//! source, sends a short greeting (the source hands it to its verifier),
//! then decodes the newline-delimited record stream and reports each
//! reading.  When the source goes away the monitor waits and reconnects.
//!
//! Events flow to the caller over an `mpsc` channel so the binary (or a
//! test) can consume them at its own pace:
//!
//! ```text
//! MonitorConnection::start()
//!  └─ reconnect loop
//!       ├─ connect + greeting   -> MonitorEvent::Connected
//!       ├─ each decoded record  -> MonitorEvent::Reading
//!       └─ EOF / error          -> MonitorEvent::Disconnected
//! ```

/// Infrastructure layer: the TCP connection to the source.
pub mod infrastructure;
