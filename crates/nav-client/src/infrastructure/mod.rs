//! Infrastructure layer for the client.
//!
//! Contains everything that touches a socket.
//!
//! **Dependency rule**: this layer may depend on `application`, `domain` and
//! `nav_core`, but MUST NOT be imported by the `application` or `domain`
//! layers.
//!
//! # Sub-modules
//!
//! - **`connector`** – opens the byte stream.  `TcpConnector` for real
//!   servers; the `Connector` trait lets tests hand in in-memory streams.
//!
//! - **`transport`** – turns a byte stream into newline-delimited frames,
//!   with read/write deadlines and a frame size limit.
//!
//! - **`client`** – `NavClient`: connect handshake, session state and the
//!   one-request-one-response `call`.  Implements the application layer's
//!   `RequestChannel` so the typed operations run on top of it.

pub mod client;
pub mod connector;
pub mod transport;
