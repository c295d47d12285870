//! Text codec for encoding requests and decoding responses.
//!
//! Wire format:
//! ```text
//! request   {sessionId}|{requestSeq}|{operationCode}|{k1}={v1};{k2}={v2}\n
//! response  {sessionId}|{requestSeq}|{statusCode}|{message}[|{payload}]\n
//! ```
//!
//! Inside `message` and `payload` a literal `|` travels as the two-character
//! sequence `\p`.  No other escape exists: the backslash itself is never
//! escaped, and the leading numeric fields are never unescaped.
//!
//! Outbound parameters are not escaped at all.  Keys and values containing a
//! separator (`;`, `=`, `|`) or a line break are rejected with
//! [`EncodeError::ForbiddenCharacter`] instead of producing an ambiguous line.

use crate::protocol::messages::{
    Params, Request, Response, ResponseStatus, FIELD_SEPARATOR, FRAME_DELIMITER,
    KEY_VALUE_SEPARATOR, PARAM_SEPARATOR, PIPE_ESCAPE,
};
use thiserror::Error;

/// Characters that may not appear in an outbound parameter key or value.
pub const FORBIDDEN_PARAM_CHARS: [char; 5] = [
    PARAM_SEPARATOR,
    KEY_VALUE_SEPARATOR,
    FIELD_SEPARATOR,
    '\n',
    '\r',
];

/// Minimum number of top-level fields in a response line.
const MIN_RESPONSE_FIELDS: usize = 3;

/// Maximum number of top-level fields; anything after the fourth separator
/// belongs to the payload.
const MAX_RESPONSE_FIELDS: usize = 5;

/// Errors that can occur while encoding a request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A parameter key or value contains a character the wire format cannot carry.
    #[error("parameter {field:?} contains forbidden character {character:?}")]
    ForbiddenCharacter { field: String, character: char },

    /// A parameter key is empty.
    #[error("parameter key must not be empty")]
    EmptyKey,
}

/// Errors that can occur while decoding a response line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The line does not have the expected shape (too few fields, bad integer, bad UTF-8).
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The status code is an integer outside the enumerated set.
    #[error("unknown response status code: {0}")]
    UnknownStatus(i64),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Checks that every key and value in `params` can be written unescaped.
///
/// # Errors
///
/// Returns [`EncodeError::EmptyKey`] for an empty key and
/// [`EncodeError::ForbiddenCharacter`] for the first offending character.
pub fn validate_params(params: &Params) -> Result<(), EncodeError> {
    for (key, value) in params.iter() {
        if key.is_empty() {
            return Err(EncodeError::EmptyKey);
        }
        for field in [key, value] {
            if let Some(character) = field.chars().find(|c| FORBIDDEN_PARAM_CHARS.contains(c)) {
                return Err(EncodeError::ForbiddenCharacter {
                    field: key.to_string(),
                    character,
                });
            }
        }
    }
    Ok(())
}

/// Encodes a [`Request`] into one newline-terminated frame.
///
/// # Errors
///
/// Returns [`EncodeError`] if a parameter cannot be represented on the wire.
///
/// # Examples
///
/// ```rust
/// use nav_core::protocol::{encode_request, OperationCode, Params, Request};
///
/// let req = Request {
///     session_id: 5,
///     request_seq: 2,
///     operation: OperationCode::FindPath,
///     params: Params::new().with("sourceId", "1").with("destId", "4"),
/// };
/// assert_eq!(encode_request(&req).unwrap(), b"5|2|2|sourceId=1;destId=4\n");
/// ```
pub fn encode_request(request: &Request) -> Result<Vec<u8>, EncodeError> {
    validate_params(&request.params)?;

    let separator = PARAM_SEPARATOR.to_string();
    let params = request
        .params
        .iter()
        .map(|(k, v)| format!("{k}{KEY_VALUE_SEPARATOR}{v}"))
        .collect::<Vec<_>>()
        .join(separator.as_str());

    let line = format!(
        "{sid}{sep}{seq}{sep}{op}{sep}{params}",
        sid = request.session_id,
        seq = request.request_seq,
        op = request.operation.code(),
        sep = FIELD_SEPARATOR,
    );

    let mut frame = line.into_bytes();
    frame.push(FRAME_DELIMITER);
    Ok(frame)
}

/// Encodes a [`Response`] the way the server does, escaping `|` in the
/// message and payload.
///
/// The client never sends responses; this exists for test servers and for
/// checking the escape round-trip.
pub fn encode_response(response: &Response) -> Vec<u8> {
    let line = format!(
        "{sid}{sep}{seq}{sep}{status}{sep}{message}{sep}{payload}",
        sid = response.session_id,
        seq = response.request_seq,
        status = response.status.code(),
        message = escape_field(&response.message),
        payload = escape_field(&response.payload),
        sep = FIELD_SEPARATOR,
    );
    let mut frame = line.into_bytes();
    frame.push(FRAME_DELIMITER);
    frame
}

/// Decodes one response frame given as raw bytes (delimiter optional).
///
/// # Errors
///
/// Returns [`DecodeError::Malformed`] if the bytes are not UTF-8, otherwise
/// whatever [`decode_response`] returns.
pub fn decode_response_frame(frame: &[u8]) -> Result<Response, DecodeError> {
    let line = std::str::from_utf8(frame)
        .map_err(|e| DecodeError::Malformed(format!("frame is not valid UTF-8: {e}")))?;
    decode_response(line)
}

/// Decodes one response line.
///
/// A trailing `\n` (and a `\r` before it) is tolerated.  The line is split on
/// `|` first; only the message and payload fields are then unescaped.
///
/// # Errors
///
/// - [`DecodeError::Malformed`] if fewer than three fields are present or a
///   numeric field does not parse.
/// - [`DecodeError::UnknownStatus`] if the status code is not 0–3.
///
/// # Examples
///
/// ```rust
/// use nav_core::protocol::{decode_response, ResponseStatus};
///
/// let resp = decode_response("5|3|1|Not\\pFound").unwrap();
/// assert_eq!(resp.status, ResponseStatus::Failure);
/// assert_eq!(resp.message, "Not|Found");
/// ```
pub fn decode_response(line: &str) -> Result<Response, DecodeError> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);

    let fields: Vec<&str> = line.splitn(MAX_RESPONSE_FIELDS, FIELD_SEPARATOR).collect();
    if fields.len() < MIN_RESPONSE_FIELDS {
        return Err(DecodeError::Malformed(format!(
            "expected at least {MIN_RESPONSE_FIELDS} fields, found {}",
            fields.len()
        )));
    }

    let session_id = parse_id(fields[0], "session id")?;
    let request_seq = parse_id(fields[1], "request sequence")?;

    let status_code: i64 = fields[2]
        .trim()
        .parse()
        .map_err(|_| DecodeError::Malformed(format!("status code {:?} is not an integer", fields[2])))?;
    let status =
        ResponseStatus::try_from(status_code).map_err(|_| DecodeError::UnknownStatus(status_code))?;

    let message = fields.get(3).map(|f| unescape_field(f)).unwrap_or_default();
    let payload = fields.get(4).map(|f| unescape_field(f)).unwrap_or_default();

    Ok(Response {
        session_id,
        request_seq,
        status,
        message,
        payload,
    })
}

/// Replaces every `|` with the wire escape `\p`.
pub fn escape_field(raw: &str) -> String {
    raw.replace(FIELD_SEPARATOR, PIPE_ESCAPE)
}

/// Replaces every `\p` with `|`, scanning left to right without re-entry.
pub fn unescape_field(wire: &str) -> String {
    wire.replace(PIPE_ESCAPE, &FIELD_SEPARATOR.to_string())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_id(field: &str, what: &str) -> Result<u64, DecodeError> {
    field
        .trim()
        .parse()
        .map_err(|_| DecodeError::Malformed(format!("{what} {field:?} is not a non-negative integer")))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
