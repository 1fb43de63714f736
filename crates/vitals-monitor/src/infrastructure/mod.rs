//! Infrastructure layer for the monitor.
//!
//! - **`network`** – TCP client that connects to the source, sends the
//!   greeting, splits the byte stream into readings, and reconnects when the
//!   connection drops.

pub mod network;
