//! nav-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does nav-client do?
//!
//! The navigation server keeps a graph of locations and roads and answers
//! shortest-path queries.  This crate is the client side of its line
//! protocol:
//!
//! 1. Opens a TCP connection with a bounded timeout and reads the server's
//!    welcome line, which carries the session id.
//! 2. Sends one request line per operation and waits for exactly one
//!    response line before sending the next.
//! 3. Decodes each response into a typed [`nav_core::Response`] and, for
//!    operations with structured payloads, into typed domain values.
//! 4. Drops the session on any transport failure; reconnecting is the
//!    caller's decision.
//!
//! ```text
//! caller ─► NavClient::find_path ─► encode ─► FramedTransport::write_frame
//!                                              │
//! caller ◄─ Response ◄─ decode ◄─ FramedTransport::read_frame
//! ```

/// Domain layer: configuration and error types.
pub mod domain;

/// Application layer: typed operation surface.
pub mod application;

/// Infrastructure layer: TCP connector, framed transport, protocol client.
pub mod infrastructure;

pub use application::operations::{NavigationOps, RequestChannel};
pub use domain::config::ClientConfig;
pub use infrastructure::client::{ClientError, NavClient};
pub use infrastructure::connector::{ConnectError, Connector, TcpConnector};
pub use infrastructure::transport::{FramedTransport, TransportError};
