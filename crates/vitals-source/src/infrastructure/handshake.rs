//! The single initial read that feeds the verifier.
//!
//! Right after accept, the source does one read of up to
//! `read_buffer_size` bytes.  There is no length negotiation: whatever the
//! first read returns is what the verifier sees.  The read is bounded by a
//! deadline so a silent client cannot hold the listener hostage.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;
use tracing::debug;

use crate::application::VerificationFailure;

/// Reads the client's opening bytes.
///
/// Returns an empty vector if nothing arrived before `deadline`.
///
/// # Errors
///
/// - [`VerificationFailure::ClientClosed`] if the read returned zero bytes
///   (the client hung up without sending anything).
/// - [`VerificationFailure::Io`] if the read itself failed.
pub async fn read_initial_bytes<R>(
    reader: &mut R,
    buffer_size: usize,
    deadline: Duration,
) -> Result<Vec<u8>, VerificationFailure>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; buffer_size.max(1)];

    match timeout(deadline, reader.read(&mut buf)).await {
        Ok(Ok(0)) => Err(VerificationFailure::ClientClosed),
        Ok(Ok(n)) => {
            buf.truncate(n);
            Ok(buf)
        }
        Ok(Err(e)) => Err(VerificationFailure::Io(e)),
        Err(_) => {
            debug!("no initial bytes within {deadline:?}; verifying empty payload");
            Ok(Vec::new())
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    const DEADLINE: Duration = Duration::from_millis(50);

    #[tokio::test]
    async fn test_returns_bytes_sent_by_client() {
        // Arrange
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(b"Test").await.unwrap();

        // Act
        let initial = read_initial_bytes(&mut server, 4096, DEADLINE).await.unwrap();

        // Assert
        assert_eq!(initial, b"Test");
    }

    #[tokio::test]
    async fn test_single_read_is_capped_at_buffer_size() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(b"0123456789").await.unwrap();

        let initial = read_initial_bytes(&mut server, 4, DEADLINE).await.unwrap();

        assert_eq!(initial, b"0123");
    }

    #[tokio::test]
    async fn test_silent_client_yields_empty_payload_after_deadline() {
        // Keep `_client` alive so the read pends instead of seeing EOF.
        let (_client, mut server) = tokio::io::duplex(64);

        let initial = read_initial_bytes(&mut server, 4096, DEADLINE).await.unwrap();

        assert!(initial.is_empty());
    }

    #[tokio::test]
    async fn test_client_closing_first_is_a_failure() {
        let (client, mut server) = tokio::io::duplex(64);
        drop(client);

        let result = read_initial_bytes(&mut server, 4096, DEADLINE).await;

        assert!(matches!(result, Err(VerificationFailure::ClientClosed)));
    }

    #[tokio::test]
    async fn test_read_error_is_reported_as_io_failure() {
        let mut reader = tokio_test::io::Builder::new()
            .read_error(std::io::Error::from(std::io::ErrorKind::ConnectionReset))
            .build();

        let result = read_initial_bytes(&mut reader, 4096, DEADLINE).await;

        assert!(matches!(result, Err(VerificationFailure::Io(_))));
    }
}
