//! Newline-framed transport over any async byte stream.
//!
//! # Why a buffer is needed
//!
//! TCP is a stream protocol.  A single `read()` may return half a response
//! line, or a full line followed by the start of another one.  The transport
//! therefore accumulates bytes in `buffer` and only hands out a frame once a
//! `\n` has arrived.
//!
//! Bytes after the first delimiter stay in the buffer for the next
//! [`read_frame`](FramedTransport::read_frame).  The protocol is strictly
//! request/response, so the client treats such leftovers as an anomaly and
//! drops them with [`discard_buffered`](FramedTransport::discard_buffered)
//! after each call.
//!
//! On timeout, EOF, read error or an oversized frame the buffer is cleared:
//! a half-read line is never carried into the next call.

use std::time::Duration;

use nav_core::protocol::FRAME_DELIMITER;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

pub use crate::domain::errors::TransportError;

/// Size of each individual `read()` into the accumulation buffer.
const READ_CHUNK_SIZE: usize = 4096;

/// Owns the stream and the receive buffer for one connection.
#[derive(Debug)]
pub struct FramedTransport<S> {
    stream: S,
    buffer: Vec<u8>,
    read_timeout: Duration,
    write_timeout: Duration,
    max_frame_len: usize,
}

impl<S> FramedTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, read_timeout: Duration, write_timeout: Duration, max_frame_len: usize) -> Self {
        Self {
            stream,
            buffer: Vec::with_capacity(READ_CHUNK_SIZE),
            read_timeout,
            write_timeout,
            max_frame_len,
        }
    }

    /// Writes one complete frame and flushes it.
    ///
    /// `write_all` loops over short writes, so either every byte is handed to
    /// the stream or an error is returned.
    ///
    /// # Errors
    ///
    /// [`TransportError::WriteFailed`] on I/O failure, [`TransportError::Timeout`]
    /// if the write does not complete within the write timeout.
    pub async fn write_frame(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        let deadline = self.write_timeout;
        let stream = &mut self.stream;
        let write = async move {
            stream.write_all(frame).await?;
            stream.flush().await
        };

        match tokio::time::timeout(deadline, write).await {
            Ok(Ok(())) => {
                trace!("wrote {} byte frame", frame.len());
                Ok(())
            }
            Ok(Err(e)) => Err(TransportError::WriteFailed(e)),
            Err(_elapsed) => Err(TransportError::Timeout),
        }
    }

    /// Returns the next frame without its trailing `\n`.
    ///
    /// # Errors
    ///
    /// - [`TransportError::Timeout`] if no complete frame arrives within the
    ///   read timeout.
    /// - [`TransportError::ConnectionClosed`] if the peer closes the stream
    ///   first.
    /// - [`TransportError::ReadFailed`] on any other I/O error.
    /// - [`TransportError::FrameTooLarge`] if the frame exceeds the limit.
    ///
    /// Every error leaves the receive buffer empty.
    pub async fn read_frame(&mut self) -> Result<Vec<u8>, TransportError> {
        let deadline = self.read_timeout;
        let result = match tokio::time::timeout(deadline, self.fill_until_delimiter()).await {
            Ok(result) => result,
            Err(_elapsed) => Err(TransportError::Timeout),
        };

        if result.is_err() {
            self.buffer.clear();
        }
        result
    }

    /// Number of received bytes not yet returned as part of a frame.
    pub fn pending_bytes(&self) -> usize {
        self.buffer.len()
    }

    /// Drops any buffered bytes and returns how many there were.
    pub fn discard_buffered(&mut self) -> usize {
        let discarded = self.buffer.len();
        self.buffer.clear();
        discarded
    }

    async fn fill_until_delimiter(&mut self) -> Result<Vec<u8>, TransportError> {
        let mut scanned = 0;
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        loop {
            if let Some(offset) = self.buffer[scanned..]
                .iter()
                .position(|&b| b == FRAME_DELIMITER)
            {
                let end = scanned + offset;
                if end > self.max_frame_len {
                    return Err(TransportError::FrameTooLarge {
                        limit: self.max_frame_len,
                    });
                }
                let mut frame: Vec<u8> = self.buffer.drain(..=end).collect();
                frame.pop();
                return Ok(frame);
            }

            scanned = self.buffer.len();
            if scanned > self.max_frame_len {
                return Err(TransportError::FrameTooLarge {
                    limit: self.max_frame_len,
                });
            }

            let n = self
                .stream
                .read(&mut chunk)
                .await
                .map_err(TransportError::ReadFailed)?;
            if n == 0 {
                trace!("EOF with {} unterminated bytes buffered", self.buffer.len());
                return Err(TransportError::ConnectionClosed);
            }
            self.buffer.extend_from_slice(&chunk[..n]);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
