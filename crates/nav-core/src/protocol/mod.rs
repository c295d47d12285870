//! Protocol module containing message types, the text codec, and session state.

pub mod codec;
pub mod messages;
pub mod sequence;
pub mod session;

pub use codec::{decode_response, encode_request, encode_response, DecodeError, EncodeError};
pub use messages::*;
pub use sequence::RequestSequence;
pub use session::{parse_session_id_or_default, ConnectionState, Session};
