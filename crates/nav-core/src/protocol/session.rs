//! Session state for one logical connection to the navigation server.
//!
//! A [`Session`] starts `Disconnected` with no id.  A successful connect
//! handshake calls [`Session::establish`] with the server-assigned id, which
//! also restarts the request sequence at 1.  Any transport failure or an
//! explicit disconnect calls [`Session::invalidate`].
//!
//! The last session id is kept after `invalidate` so that log lines written
//! after a failure can still name the session that failed.

use crate::protocol::sequence::RequestSequence;

/// Label the server puts in front of the assigned id in its welcome message.
pub const SESSION_ID_LABEL: &str = "Client ID:";

/// Session id used when the welcome message carries no parsable id.
pub const DEFAULT_SESSION_ID: u64 = 1;

/// Whether the session may currently issue requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected,
}

/// Connection status, server-assigned id, and request counter.
#[derive(Debug, Clone, Default)]
pub struct Session {
    session_id: u64,
    sequence: RequestSequence,
    state: ConnectionState,
}

impl Session {
    /// Creates a disconnected session with id 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the session connected under `session_id` and restarts the sequence.
    pub fn establish(&mut self, session_id: u64) {
        self.session_id = session_id;
        self.sequence.reset();
        self.state = ConnectionState::Connected;
    }

    /// Marks the session disconnected.  The id is retained for diagnostics.
    pub fn invalidate(&mut self) {
        self.state = ConnectionState::Disconnected;
    }

    /// Hands out the sequence number for the next request.
    pub fn allocate_seq(&mut self) -> u64 {
        self.sequence.allocate()
    }

    /// The value the next [`allocate_seq`](Self::allocate_seq) will return.
    pub fn next_request_seq(&self) -> u64 {
        self.sequence.peek()
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }
}

/// Extracts the session id from the server's welcome message.
///
/// The id is the text after the last `Client ID:` label, trimmed.  When the
/// label is missing or the text is not an integer, [`DEFAULT_SESSION_ID`] is
/// returned instead of an error.
///
/// # Examples
///
/// ```rust
/// use nav_core::protocol::parse_session_id_or_default;
///
/// assert_eq!(parse_session_id_or_default("Welcome. Client ID: 7"), 7);
/// assert_eq!(parse_session_id_or_default("Welcome!"), 1);
/// ```
pub fn parse_session_id_or_default(welcome_message: &str) -> u64 {
    match welcome_message.rsplit_once(SESSION_ID_LABEL) {
        Some((_, tail)) => tail.trim().parse().unwrap_or(DEFAULT_SESSION_ID),
        None => DEFAULT_SESSION_ID,
    }
}
