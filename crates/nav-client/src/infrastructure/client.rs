//! Protocol client: connection lifecycle and the request/response cycle.
//!
//! # Lifecycle
//!
//! ```text
//!             connect() ok
//!  Disconnected ───────────► Connected ──┐ call() ok / decode error /
//!       ▲                        │  ▲    │ sequence mismatch
//!       │ disconnect()           │  └────┘
//!       └─ any transport error ◄─┘
//! ```
//!
//! A [`NavClient`] owns its connection exclusively.  Every method that talks
//! to the server takes `&mut self`, so two requests can never be in flight on
//! the same client.  Dropping the client (or calling
//! [`disconnect`](NavClient::disconnect)) drops the transport, which closes
//! the socket.
//!
//! # Failure policy
//!
//! - Transport errors (timeout, peer close, I/O failure, oversized frame)
//!   drop the connection and leave the session `Disconnected`.  The client
//!   never reconnects on its own.
//! - A response that cannot be decoded is returned as
//!   [`ClientError::Protocol`]; the line was consumed in full, so the stream
//!   is still aligned and the session stays `Connected`.
//! - A response echoing the wrong sequence number is logged.  With
//!   `strict_sequence` it is also rejected as
//!   [`ClientError::SequenceMismatch`].

use async_trait::async_trait;
use nav_core::protocol::codec::{decode_response_frame, validate_params};
use nav_core::protocol::{
    encode_request, parse_session_id_or_default, OperationCode, Params, Request, Response,
    Session,
};
use tracing::{debug, info, warn};

use crate::application::operations::RequestChannel;
use crate::domain::config::ClientConfig;
pub use crate::domain::errors::ClientError;
use crate::domain::errors::{ConnectError, TransportError};
use crate::infrastructure::connector::{Connector, TcpConnector};
use crate::infrastructure::transport::FramedTransport;

/// Client for the navigation server's line protocol.
pub struct NavClient<C: Connector = TcpConnector> {
    connector: C,
    config: ClientConfig,
    session: Session,
    transport: Option<FramedTransport<C::Stream>>,
}

impl NavClient<TcpConnector> {
    /// Creates a disconnected client that will dial `config.server_endpoint()`.
    pub fn from_config(config: ClientConfig) -> Self {
        let connector = TcpConnector::new(config.server_endpoint(), config.connect_timeout);
        Self::with_connector(connector, config)
    }
}

impl<C: Connector> NavClient<C> {
    /// Creates a disconnected client that opens streams through `connector`.
    pub fn with_connector(connector: C, config: ClientConfig) -> Self {
        Self {
            connector,
            config,
            session: Session::new(),
            transport: None,
        }
    }

    /// Opens the connection and reads the server's welcome frame.
    ///
    /// Any previous connection is closed first.  On success the session is
    /// `Connected`, the request sequence restarts at 1, and the assigned
    /// session id is returned together with the welcome text.
    ///
    /// # Errors
    ///
    /// - [`ConnectError::Timeout`] if the handshake or the welcome frame is late.
    /// - [`ConnectError::Refused`] if nothing listens at the endpoint.
    /// - [`ConnectError::Other`] for any other failure, including a welcome
    ///   frame that does not decode.
    pub async fn connect(&mut self) -> Result<(u64, String), ConnectError> {
        self.disconnect();

        let endpoint = self.connector.endpoint();
        debug!("connecting to {endpoint}");
        let stream = self.connector.connect().await.map_err(|e| {
            warn!("connection to {endpoint} failed: {e}");
            e
        })?;

        let mut transport = FramedTransport::new(
            stream,
            self.config.read_timeout,
            self.config.write_timeout,
            self.config.max_frame_len,
        );

        let frame = transport.read_frame().await.map_err(|e| match e {
            TransportError::Timeout => ConnectError::Timeout,
            other => ConnectError::Other(format!("failed to read welcome frame: {other}")),
        })?;
        let welcome = decode_response_frame(&frame)
            .map_err(|e| ConnectError::Other(format!("invalid welcome frame: {e}")))?;

        if !welcome.is_success() {
            warn!("welcome frame carries status {:?}", welcome.status);
        }
        let leftover = transport.discard_buffered();
        if leftover > 0 {
            warn!("discarded {leftover} unexpected bytes after the welcome frame");
        }

        let session_id = parse_session_id_or_default(&welcome.message);
        self.session.establish(session_id);
        self.transport = Some(transport);
        info!("connected to {endpoint} as session {session_id}");

        Ok((session_id, welcome.message))
    }

    /// Closes the connection if one is open.  Safe to call repeatedly.
    ///
    /// The last session id is kept so it can still be reported.
    pub fn disconnect(&mut self) {
        if self.transport.take().is_some() {
            info!("disconnected session {}", self.session.session_id());
        }
        self.session.invalidate();
    }

    /// Sends one request and waits for its response.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NotConnected`] before a successful connect; nothing
    ///   is written and no sequence number is used.
    /// - [`ClientError::Encode`] if a parameter cannot be written on the
    ///   wire; nothing is written and no sequence number is used.
    /// - [`ClientError::Transport`] on any transport failure; the session is
    ///   disconnected.
    /// - [`ClientError::Protocol`] if the response does not decode.
    /// - [`ClientError::SequenceMismatch`] in strict mode if the response
    ///   belongs to another request.
    pub async fn call(
        &mut self,
        operation: OperationCode,
        params: Params,
    ) -> Result<Response, ClientError> {
        if !self.session.is_connected() || self.transport.is_none() {
            return Err(ClientError::NotConnected);
        }
        validate_params(&params)?;

        let request = Request {
            session_id: self.session.session_id(),
            request_seq: self.session.allocate_seq(),
            operation,
            params,
        };
        let frame = encode_request(&request)?;
        debug!(
            "sending {} seq={} ({} bytes)",
            operation.name(),
            request.request_seq,
            frame.len()
        );

        let exchanged = match self.transport.as_mut() {
            Some(transport) => exchange(transport, &frame).await,
            None => return Err(ClientError::NotConnected),
        };
        let reply = match exchanged {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    "{} seq={} failed: {e}; dropping session {}",
                    operation.name(),
                    request.request_seq,
                    self.session.session_id()
                );
                self.transport = None;
                self.session.invalidate();
                return Err(e.into());
            }
        };

        if let Some(transport) = self.transport.as_mut() {
            let leftover = transport.discard_buffered();
            if leftover > 0 {
                warn!("discarded {leftover} unexpected bytes after response seq={}", request.request_seq);
            }
        }

        let response = decode_response_frame(&reply).map_err(|e| {
            warn!("undecodable response to seq={}: {e}", request.request_seq);
            e
        })?;
        debug!(
            "received seq={} status={:?}",
            response.request_seq, response.status
        );

        if response.session_id != request.session_id {
            warn!(
                "response names session {} but this session is {}",
                response.session_id, request.session_id
            );
        }
        if response.request_seq != request.request_seq {
            warn!(
                "response seq={} does not match request seq={}",
                response.request_seq, request.request_seq
            );
            if self.config.strict_sequence {
                return Err(ClientError::SequenceMismatch {
                    expected: request.request_seq,
                    received: response.request_seq,
                });
            }
        }

        Ok(response)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Description of the server endpoint, as reported by the connector.
    pub fn endpoint(&self) -> String {
        self.connector.endpoint()
    }
}

#[async_trait]
impl<C: Connector> RequestChannel for NavClient<C> {
    async fn call(
        &mut self,
        operation: OperationCode,
        params: Params,
    ) -> Result<Response, ClientError> {
        NavClient::call(self, operation, params).await
    }
}

/// One write followed by exactly one read.
async fn exchange<S>(
    transport: &mut FramedTransport<S>,
    frame: &[u8],
) -> Result<Vec<u8>, TransportError>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    transport.write_frame(frame).await?;
    transport.read_frame().await
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::connector::MockConnector;
    use nav_core::protocol::{ConnectionState, ResponseStatus};
    use nav_core::DecodeError;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
    use tokio::task::JoinHandle;

    const WELCOME_42: &str = "0|0|0|Welcome to Mini Google Maps Server. Client ID: 42\n";

    fn test_config() -> ClientConfig {
        ClientConfig {
            read_timeout: Duration::from_secs(2),
            write_timeout: Duration::from_secs(2),
            ..ClientConfig::default()
        }
    }

    fn connector_for(stream: DuplexStream) -> MockConnector {
        let mut mock = MockConnector::new();
        mock.expect_connect().return_once(move || Ok(stream));
        mock.expect_endpoint().return_const("duplex".to_string());
        mock
    }

    /// Reads `sid|seq|...` off a request line.
    fn ids(line: &str) -> (u64, u64) {
        let mut fields = line.split('|');
        let sid = fields.next().unwrap().parse().unwrap();
        let seq = fields.next().unwrap().parse().unwrap();
        (sid, seq)
    }

    /// Scripted server: sends `welcome`, then for every request line writes
    /// whatever `respond` returns.  `None` closes the connection.  Resolves to
    /// the request lines it received.
    fn spawn_server<F>(stream: DuplexStream, welcome: &'static str, mut respond: F) -> JoinHandle<Vec<String>>
    where
        F: FnMut(&str) -> Option<String> + Send + 'static,
    {
        tokio::spawn(async move {
            let (reader, mut writer) = tokio::io::split(stream);
            let mut received = Vec::new();
            writer.write_all(welcome.as_bytes()).await.unwrap();
            let mut lines = BufReader::new(reader).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let reply = respond(&line);
                received.push(line);
                match reply {
                    Some(bytes) => {
                        if writer.write_all(bytes.as_bytes()).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            received
        })
    }

    fn echo_ok(line: &str) -> Option<String> {
        let (sid, seq) = ids(line);
        Some(format!("{sid}|{seq}|0|OK|\n"))
    }

    async fn connected_client<F>(respond: F) -> (NavClient<MockConnector>, JoinHandle<Vec<String>>)
    where
        F: FnMut(&str) -> Option<String> + Send + 'static,
    {
        connected_client_with(test_config(), respond).await
    }

    async fn connected_client_with<F>(
        config: ClientConfig,
        respond: F,
    ) -> (NavClient<MockConnector>, JoinHandle<Vec<String>>)
    where
        F: FnMut(&str) -> Option<String> + Send + 'static,
    {
        let (client_side, server_side) = tokio::io::duplex(4096);
        let server = spawn_server(server_side, WELCOME_42, respond);
        let mut client = NavClient::with_connector(connector_for(client_side), config);
        client.connect().await.unwrap();
        (client, server)
    }

    // ── connect / disconnect ─────────────────────────────────────────────────

    #[tokio::test]
    async fn test_call_before_connect_is_not_connected_without_io() {
        // Arrange: a connector that must never be used
        let mut mock = MockConnector::new();
        mock.expect_connect().times(0);
        let mut client = NavClient::with_connector(mock, test_config());

        // Act
        let result = client.call(OperationCode::GetLocations, Params::new()).await;

        // Assert
        assert!(matches!(result, Err(ClientError::NotConnected)));
        assert_eq!(client.session().next_request_seq(), 1);
    }

    #[tokio::test]
    async fn test_connect_extracts_session_id_from_welcome() {
        let (client, _server) = connected_client(echo_ok).await;

        assert!(client.is_connected());
        assert_eq!(client.session().session_id(), 42);
        assert_eq!(client.session().next_request_seq(), 1);
    }

    #[tokio::test]
    async fn test_connect_returns_welcome_text() {
        let (client_side, server_side) = tokio::io::duplex(1024);
        let _server = spawn_server(server_side, WELCOME_42, echo_ok);
        let mut client = NavClient::with_connector(connector_for(client_side), test_config());

        let (session_id, message) = client.connect().await.unwrap();

        assert_eq!(session_id, 42);
        assert_eq!(message, "Welcome to Mini Google Maps Server. Client ID: 42");
    }

    #[tokio::test]
    async fn test_welcome_without_id_falls_back_to_one() {
        let (client_side, server_side) = tokio::io::duplex(1024);
        let _server = spawn_server(server_side, "0|0|0|Hello there\n", echo_ok);
        let mut client = NavClient::with_connector(connector_for(client_side), test_config());

        let (session_id, _) = client.connect().await.unwrap();

        assert_eq!(session_id, 1);
        assert!(client.is_connected());
    }

    #[tokio::test]
    async fn test_refused_connect_leaves_client_disconnected() {
        let mut mock = MockConnector::new();
        mock.expect_connect().return_once(|| Err(ConnectError::Refused));
        mock.expect_endpoint().return_const("nowhere".to_string());
        let mut client = NavClient::with_connector(mock, test_config());

        let result = client.connect().await;

        assert!(matches!(result, Err(ConnectError::Refused)));
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_silent_server_is_connect_timeout() {
        // Arrange: the server accepts but never sends a welcome
        let (client_side, _server_side) = tokio::io::duplex(1024);
        let config = ClientConfig {
            read_timeout: Duration::from_millis(50),
            ..test_config()
        };
        let mut client = NavClient::with_connector(connector_for(client_side), config);

        // Act
        let result = client.connect().await;

        // Assert
        assert!(matches!(result, Err(ConnectError::Timeout)));
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_undecodable_welcome_is_connect_other() {
        let (client_side, server_side) = tokio::io::duplex(1024);
        let _server = spawn_server(server_side, "hello\n", echo_ok);
        let mut client = NavClient::with_connector(connector_for(client_side), test_config());

        let result = client.connect().await;

        assert!(matches!(result, Err(ConnectError::Other(_))));
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent_and_keeps_session_id() {
        // Arrange
        let (mut client, _server) = connected_client(echo_ok).await;

        // Act
        client.disconnect();
        client.disconnect();

        // Assert
        assert_eq!(client.session().state(), ConnectionState::Disconnected);
        assert_eq!(client.session().session_id(), 42);
        let result = client.call(OperationCode::GetRoads, Params::new()).await;
        assert!(matches!(result, Err(ClientError::NotConnected)));
    }

    #[tokio::test]
    async fn test_disconnect_before_connect_is_harmless() {
        let mut client = NavClient::with_connector(MockConnector::new(), test_config());
        client.disconnect();
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_reconnect_restarts_sequence_at_one() {
        // Arrange: two independent server connections
        let (c1, s1) = tokio::io::duplex(1024);
        let (c2, s2) = tokio::io::duplex(1024);
        let first = spawn_server(s1, WELCOME_42, echo_ok);
        let second = spawn_server(s2, "0|0|0|Welcome. Client ID: 43\n", echo_ok);
        let streams = Mutex::new(VecDeque::from(vec![c1, c2]));
        let mut mock = MockConnector::new();
        mock.expect_connect()
            .times(2)
            .returning(move || Ok(streams.lock().unwrap().pop_front().unwrap()));
        mock.expect_endpoint().return_const("duplex".to_string());
        let mut client = NavClient::with_connector(mock, test_config());

        // Act
        client.connect().await.unwrap();
        client.call(OperationCode::SaveData, Params::new()).await.unwrap();
        client.call(OperationCode::SaveData, Params::new()).await.unwrap();
        client.connect().await.unwrap();
        let resp = client.call(OperationCode::SaveData, Params::new()).await.unwrap();
        client.disconnect();

        // Assert
        assert_eq!(resp.session_id, 43);
        assert_eq!(resp.request_seq, 1);
        assert_eq!(first.await.unwrap().len(), 2);
        assert_eq!(second.await.unwrap(), vec!["43|1|7|".to_string()]);
    }

    // ── call ─────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_request_seq_increases_by_one_from_one() {
        // Arrange
        let (mut client, server) = connected_client(echo_ok).await;

        // Act
        let mut seen = Vec::new();
        for _ in 0..5 {
            let resp = client
                .call(OperationCode::GetLocations, Params::new())
                .await
                .unwrap();
            seen.push(resp.request_seq);
        }
        client.disconnect();

        // Assert
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
        let sent: Vec<u64> = server.await.unwrap().iter().map(|l| ids(l).1).collect();
        assert_eq!(sent, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_request_line_carries_session_and_params() {
        let (mut client, server) = connected_client(echo_ok).await;

        client
            .call(OperationCode::FindPath, Params::new().with("sourceId", "1").with("destId", "3"))
            .await
            .unwrap();
        client.disconnect();

        assert_eq!(server.await.unwrap(), vec!["42|1|2|sourceId=1;destId=3".to_string()]);
    }

    #[tokio::test]
    async fn test_failure_status_is_returned_not_raised() {
        let (mut client, _server) = connected_client(|line| {
            let (sid, seq) = ids(line);
            Some(format!("{sid}|{seq}|2|Location\\pnot found\n"))
        })
        .await;

        let resp = client.call(OperationCode::GetLocation, Params::new().with("id", "9")).await.unwrap();

        assert_eq!(resp.status, ResponseStatus::NotFound);
        assert_eq!(resp.message, "Location|not found");
        assert!(client.is_connected());
    }

    #[tokio::test]
    async fn test_stalled_response_times_out_and_disconnects() {
        // Arrange: the server reads the request but never answers
        let config = ClientConfig {
            read_timeout: Duration::from_millis(50),
            ..test_config()
        };
        let (mut client, _server) = connected_client_with(config, |_| Some(String::new())).await;

        // Act
        let result = client.call(OperationCode::GetRoads, Params::new()).await;

        // Assert
        assert!(matches!(
            result,
            Err(ClientError::Transport(TransportError::Timeout))
        ));
        assert_eq!(client.session().state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_peer_close_mid_call_is_connection_closed_and_disconnects() {
        let (mut client, _server) = connected_client(|_| None).await;

        let result = client.call(OperationCode::GetRoads, Params::new()).await;

        assert!(matches!(
            result,
            Err(ClientError::Transport(TransportError::ConnectionClosed))
        ));
        assert_eq!(client.session().state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_undecodable_response_keeps_connection() {
        // Arrange: first reply is garbage, the rest are fine
        let mut first = true;
        let (mut client, _server) = connected_client(move |line| {
            if std::mem::take(&mut first) {
                Some("not a response\n".to_string())
            } else {
                echo_ok(line)
            }
        })
        .await;

        // Act
        let bad = client.call(OperationCode::GetLocations, Params::new()).await;
        let good = client.call(OperationCode::GetLocations, Params::new()).await;

        // Assert
        assert!(matches!(bad, Err(ClientError::Protocol(DecodeError::Malformed(_)))));
        assert!(client.is_connected());
        assert_eq!(good.unwrap().request_seq, 2);
    }

    #[tokio::test]
    async fn test_unknown_status_is_protocol_error() {
        let (mut client, _server) = connected_client(|line| {
            let (sid, seq) = ids(line);
            Some(format!("{sid}|{seq}|7|anything\n"))
        })
        .await;

        let result = client.call(OperationCode::SaveData, Params::new()).await;

        assert!(matches!(
            result,
            Err(ClientError::Protocol(DecodeError::UnknownStatus(7)))
        ));
        assert!(client.is_connected());
    }

    #[tokio::test]
    async fn test_forbidden_parameter_is_rejected_before_sending() {
        // Arrange
        let (mut client, server) = connected_client(echo_ok).await;

        // Act
        let result = client
            .call(OperationCode::AddLocation, Params::new().with("name", "a;b"))
            .await;
        client.disconnect();

        // Assert
        assert!(matches!(result, Err(ClientError::Encode(_))));
        assert_eq!(client.session().next_request_seq(), 1, "no sequence number used");
        assert!(server.await.unwrap().is_empty(), "nothing written");
    }

    #[tokio::test]
    async fn test_sequence_mismatch_is_tolerated_by_default() {
        let (mut client, _server) = connected_client(|line| {
            let (sid, seq) = ids(line);
            Some(format!("{sid}|{}|0|OK\n", seq + 10))
        })
        .await;

        let resp = client.call(OperationCode::SaveData, Params::new()).await.unwrap();

        assert_eq!(resp.request_seq, 11);
    }

    #[tokio::test]
    async fn test_sequence_mismatch_is_rejected_in_strict_mode() {
        // Arrange
        let config = ClientConfig {
            strict_sequence: true,
            ..test_config()
        };
        let (mut client, _server) = connected_client_with(config, |line| {
            let (sid, seq) = ids(line);
            Some(format!("{sid}|{}|0|OK\n", seq + 10))
        })
        .await;

        // Act
        let result = client.call(OperationCode::SaveData, Params::new()).await;

        // Assert
        assert!(matches!(
            result,
            Err(ClientError::SequenceMismatch {
                expected: 1,
                received: 11
            })
        ));
        assert!(client.is_connected());
    }

    #[tokio::test]
    async fn test_bytes_after_response_are_discarded() {
        // Arrange: the server appends a stray partial frame to every reply
        let (mut client, _server) = connected_client(|line| {
            let (sid, seq) = ids(line);
            Some(format!("{sid}|{seq}|0|OK\nstray"))
        })
        .await;

        // Act
        let resp = client.call(OperationCode::SaveData, Params::new()).await.unwrap();

        // Assert
        assert_eq!(resp.message, "OK");
        let pending = client.transport.as_ref().map(|t| t.pending_bytes());
        assert_eq!(pending, Some(0));
    }
}
