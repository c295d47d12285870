//! # nav-core
//!
//! Shared library for the Mini Maps navigation client containing the text
//! wire codec, the per-connection session state, and the decoders for each
//! operation's response payload.
//!
//! It has zero dependencies on OS APIs, async runtimes, or network sockets.
//!
//! # Architecture overview
//!
//! The navigation service runs remotely and speaks a line-oriented text
//! protocol over TCP.  Each request is one line, each response is one line:
//!
//! ```text
//! client → server   5|9|1|sourceId=1;destId=2;distance=3.5\n
//! server → client   5|9|0|Road added successfully|id=12\n
//! ```
//!
//! This crate defines:
//!
//! - **`protocol`** – How lines travel over the wire.  Requests are encoded
//!   from an [`OperationCode`] plus ordered parameters; response lines are
//!   decoded back into a typed [`Response`].  Also holds the [`Session`]
//!   state (server-assigned id, request sequence, connection state).
//!
//! - **`domain`** – Decoders for the operation-specific payload grammars
//!   (location listings, path results, road listings, ...).  The codec treats
//!   payloads as opaque strings; these helpers give them structure.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `nav_core::Response` instead of `nav_core::protocol::messages::Response`.
pub use domain::payload::{
    LocationDetail, LocationEntry, PathHop, PathSummary, PayloadError, RoadEntry, SampleSummary,
};
pub use protocol::codec::{decode_response, encode_request, DecodeError, EncodeError};
pub use protocol::messages::{OperationCode, Params, Request, Response, ResponseStatus};
pub use protocol::session::{ConnectionState, Session};
