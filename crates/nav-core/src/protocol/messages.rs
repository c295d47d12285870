//! All navigation protocol message types.
//!
//! A request line carries `sessionId|requestSeq|operationCode|params` and a
//! response line carries `sessionId|requestSeq|statusCode|message[|payload]`.
//! Both are terminated by a single `\n`.

// ── Protocol constants ────────────────────────────────────────────────────────

/// Separates the top-level fields of a request or response line.
pub const FIELD_SEPARATOR: char = '|';

/// Separates `key=value` entries inside the request parameter field.
pub const PARAM_SEPARATOR: char = ';';

/// Joins a parameter key to its value.
pub const KEY_VALUE_SEPARATOR: char = '=';

/// Terminates every frame in both directions.
pub const FRAME_DELIMITER: u8 = b'\n';

/// Two-character wire escape for a literal `|` inside message and payload.
pub const PIPE_ESCAPE: &str = "\\p";

// ── Operation codes ───────────────────────────────────────────────────────────

/// Selects which remote capability a request invokes.
///
/// The numeric values are fixed by the server and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OperationCode {
    AddLocation = 0,
    AddRoad = 1,
    FindPath = 2,
    GetLocations = 3,
    GetRoads = 4,
    GetLocation = 5,
    InitSample = 6,
    SaveData = 7,
    Shutdown = 8,
    /// Sent as-is; the server answers with a Failure status.
    Unknown = 9,
}

impl OperationCode {
    /// Every operation code in wire order.
    pub const ALL: [OperationCode; 10] = [
        OperationCode::AddLocation,
        OperationCode::AddRoad,
        OperationCode::FindPath,
        OperationCode::GetLocations,
        OperationCode::GetRoads,
        OperationCode::GetLocation,
        OperationCode::InitSample,
        OperationCode::SaveData,
        OperationCode::Shutdown,
        OperationCode::Unknown,
    ];

    /// Returns the integer written on the wire.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Upper-case name used in log output.
    pub fn name(self) -> &'static str {
        match self {
            OperationCode::AddLocation => "ADD_LOCATION",
            OperationCode::AddRoad => "ADD_ROAD",
            OperationCode::FindPath => "FIND_PATH",
            OperationCode::GetLocations => "GET_LOCATIONS",
            OperationCode::GetRoads => "GET_ROADS",
            OperationCode::GetLocation => "GET_LOCATION",
            OperationCode::InitSample => "INIT_SAMPLE",
            OperationCode::SaveData => "SAVE_DATA",
            OperationCode::Shutdown => "SHUTDOWN",
            OperationCode::Unknown => "UNKNOWN",
        }
    }
}

impl TryFrom<u8> for OperationCode {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        OperationCode::ALL
            .into_iter()
            .find(|op| op.code() == value)
            .ok_or(())
    }
}

impl std::fmt::Display for OperationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ── Response status ───────────────────────────────────────────────────────────

/// Outcome reported by the server for a single request.
///
/// This is a closed set: any other integer on the wire is a decode error,
/// never a new status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ResponseStatus {
    Success = 0,
    Failure = 1,
    NotFound = 2,
    InvalidParams = 3,
}

impl ResponseStatus {
    /// Returns the integer written on the wire.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<i64> for ResponseStatus {
    type Error = ();

    fn try_from(value: i64) -> Result<Self, ()> {
        match value {
            0 => Ok(ResponseStatus::Success),
            1 => Ok(ResponseStatus::Failure),
            2 => Ok(ResponseStatus::NotFound),
            3 => Ok(ResponseStatus::InvalidParams),
            _ => Err(()),
        }
    }
}

// ── Request parameters ────────────────────────────────────────────────────────

/// Ordered `key → value` parameter mapping for a request.
///
/// Entries are written to the wire in insertion order so the encoded frame
/// is reproducible.  Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, keeping the original position if `key` exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder form of [`Params::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

// ── Request / Response ────────────────────────────────────────────────────────

/// One outbound operation instance.
///
/// Built fresh per call and dropped once its frame has been written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub session_id: u64,
    pub request_seq: u64,
    pub operation: OperationCode,
    pub params: Params,
}

/// One inbound decoded response line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub session_id: u64,
    pub request_seq: u64,
    pub status: ResponseStatus,
    /// Human-readable text, already unescaped.
    pub message: String,
    /// Operation-specific trailing field, already unescaped; empty when absent.
    pub payload: String,
}

impl Response {
    /// `true` when the server reported [`ResponseStatus::Success`].
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
