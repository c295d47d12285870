//! Opening the byte stream to the navigation server.
//!
//! [`Connector`] is the seam between the protocol client and the network.
//! Production code uses [`TcpConnector`]; unit tests substitute a mock that
//! hands out in-memory `tokio::io::duplex` streams, so the client logic can
//! be exercised without a socket.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::debug;

pub use crate::domain::errors::ConnectError;

/// Produces a fresh bidirectional byte stream to the server.
#[cfg_attr(test, mockall::automock(type Stream = tokio::io::DuplexStream;))]
#[async_trait]
pub trait Connector: Send + Sync {
    /// Stream type handed to the framed transport.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    /// Opens the stream, respecting the connector's own timeout.
    async fn connect(&self) -> Result<Self::Stream, ConnectError>;

    /// Human-readable description of the remote end, used in log lines.
    fn endpoint(&self) -> String;
}

/// Connects over TCP with a bounded handshake time.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    endpoint: String,
    timeout: Duration,
}

impl TcpConnector {
    /// `endpoint` is anything `TcpStream::connect` accepts, e.g. `"127.0.0.1:8080"`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self) -> Result<TcpStream, ConnectError> {
        debug!("opening TCP connection to {}", self.endpoint);
        let stream = match tokio::time::timeout(self.timeout, TcpStream::connect(&self.endpoint)).await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(map_connect_error(e)),
            Err(_elapsed) => return Err(ConnectError::Timeout),
        };

        // Request lines are tiny; send them immediately.
        if let Err(e) = stream.set_nodelay(true) {
            debug!("could not set TCP_NODELAY on {}: {e}", self.endpoint);
        }
        Ok(stream)
    }

    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }
}

/// Classifies an I/O error from the connect call.
pub(crate) fn map_connect_error(error: io::Error) -> ConnectError {
    match error.kind() {
        io::ErrorKind::ConnectionRefused => ConnectError::Refused,
        io::ErrorKind::TimedOut => ConnectError::Timeout,
        _ => ConnectError::Other(error.to_string()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
