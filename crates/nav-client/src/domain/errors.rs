//! Error taxonomy of the protocol client.
//!
//! Three layers, each wrapping the one below:
//!
//! - [`ConnectError`]: opening the connection and reading the welcome frame.
//! - [`TransportError`]: moving one frame across an open connection.
//! - [`ClientError`]: everything a single call can fail with.
//!
//! Transport errors are fatal for the session; codec and argument errors
//! are not.

use nav_core::{DecodeError, EncodeError};
use thiserror::Error;

/// Errors while establishing a connection.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The TCP handshake or the welcome frame did not arrive in time.
    #[error("connection attempt timed out")]
    Timeout,

    /// The server actively refused the connection.
    #[error("connection refused")]
    Refused,

    /// Any other failure (DNS, unreachable network, bad welcome frame, ...).
    #[error("connection failed: {0}")]
    Other(String),
}

/// Errors raised by the framed transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No complete frame arrived (or the write did not finish) before the deadline.
    #[error("timed out waiting for the server")]
    Timeout,

    /// The peer closed the stream before a full frame was received.
    #[error("connection closed by the server")]
    ConnectionClosed,

    /// Writing the request frame failed.
    #[error("failed to write frame: {0}")]
    WriteFailed(#[source] std::io::Error),

    /// Reading from the stream failed for a reason other than EOF.
    #[error("failed to read frame: {0}")]
    ReadFailed(#[source] std::io::Error),

    /// The peer sent more than `limit` bytes without a newline.
    #[error("frame exceeds {limit} bytes without a delimiter")]
    FrameTooLarge { limit: usize },
}

/// Errors returned by [`NavClient`](crate::NavClient) calls.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A call was made while the session is disconnected.  No I/O happened.
    #[error("not connected to the server")]
    NotConnected,

    /// The connection failed mid-call; the session is now disconnected.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The response frame could not be decoded; the session stays connected.
    #[error("protocol error: {0}")]
    Protocol(#[from] DecodeError),

    /// The request parameters cannot be written on the wire.
    #[error("cannot encode request: {0}")]
    Encode(#[from] EncodeError),

    /// A typed operation was given an out-of-range argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The response echoed a different sequence number than the request used.
    #[error("response sequence {received} does not match request sequence {expected}")]
    SequenceMismatch { expected: u64, received: u64 },
}

impl ClientError {
    /// `true` for failures of the communication channel itself, as opposed to
    /// problems with the caller's arguments or session state.
    pub fn is_communication_failure(&self) -> bool {
        matches!(
            self,
            ClientError::Transport(_)
                | ClientError::Protocol(_)
                | ClientError::SequenceMismatch { .. }
        )
    }
}
