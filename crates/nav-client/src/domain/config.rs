//! Client configuration.
//!
//! [`ClientConfig`] is the runtime form used by the connector, transport, and
//! client.  [`ClientConfigFile`] is the on-disk TOML schema:
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [timeouts]
//! connect_ms = 5000
//! read_ms = 5000
//! write_ms = 5000
//!
//! [protocol]
//! max_frame_bytes = 65536
//! strict_sequence = false
//! ```
//!
//! Every field has a `#[serde(default = "...")]`, so a partial file (or no
//! file at all) still yields a complete configuration.  Command-line flags
//! are layered on top of the file by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Runtime config ────────────────────────────────────────────────────────────

/// All runtime settings for one [`NavClient`](crate::NavClient).
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Hostname or IP address of the navigation server.
    pub server_host: String,
    /// TCP port of the navigation server.
    pub server_port: u16,
    /// Upper bound on the TCP connect handshake.
    pub connect_timeout: Duration,
    /// Upper bound on waiting for one complete response frame.
    pub read_timeout: Duration,
    /// Upper bound on writing one request frame.
    pub write_timeout: Duration,
    /// Largest response frame accepted before the connection is dropped.
    pub max_frame_len: usize,
    /// Reject responses whose echoed sequence differs from the request's.
    ///
    /// When `false` the mismatch is only logged.
    pub strict_sequence: bool,
}

impl ClientConfig {
    /// `host:port` string handed to the TCP connector.
    pub fn server_endpoint(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

impl Default for ClientConfig {
    /// | Field            | Default      |
    /// |------------------|--------------|
    /// | server_host      | `127.0.0.1`  |
    /// | server_port      | `8080`       |
    /// | connect_timeout  | 5 seconds    |
    /// | read_timeout     | 5 seconds    |
    /// | write_timeout    | 5 seconds    |
    /// | max_frame_len    | 64 KiB       |
    /// | strict_sequence  | `false`      |
    fn default() -> Self {
        ClientConfigFile::default().into()
    }
}

// ── File schema ───────────────────────────────────────────────────────────────

/// Top-level TOML document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClientConfigFile {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub timeouts: TimeoutSection,
    #[serde(default)]
    pub protocol: ProtocolSection,
}

/// Where the navigation server listens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Deadlines in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeoutSection {
    #[serde(default = "default_timeout_ms")]
    pub connect_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub read_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub write_ms: u64,
}

/// Framing limits and correlation policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProtocolSection {
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
    #[serde(default)]
    pub strict_sequence: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_timeout_ms() -> u64 {
    5_000
}
fn default_max_frame_bytes() -> usize {
    64 * 1024
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for TimeoutSection {
    fn default() -> Self {
        Self {
            connect_ms: default_timeout_ms(),
            read_ms: default_timeout_ms(),
            write_ms: default_timeout_ms(),
        }
    }
}

impl Default for ProtocolSection {
    fn default() -> Self {
        Self {
            max_frame_bytes: default_max_frame_bytes(),
            strict_sequence: false,
        }
    }
}

impl ClientConfigFile {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the TOML is malformed.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

impl From<ClientConfigFile> for ClientConfig {
    fn from(file: ClientConfigFile) -> Self {
        Self {
            server_host: file.server.host,
            server_port: file.server.port,
            connect_timeout: Duration::from_millis(file.timeouts.connect_ms),
            read_timeout: Duration::from_millis(file.timeouts.read_ms),
            write_timeout: Duration::from_millis(file.timeouts.write_ms),
            max_frame_len: file.protocol.max_frame_bytes,
            strict_sequence: file.protocol.strict_sequence,
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Loads the config file at `path`, returning the defaults if it does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_file(path: &Path) -> Result<ClientConfigFile, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => ClientConfigFile::from_toml_str(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientConfigFile::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Platform-appropriate location of the config file, if one can be determined.
///
/// - Windows: `%APPDATA%\nav-client\config.toml`
/// - elsewhere: `$XDG_CONFIG_HOME/nav-client/config.toml` or
///   `~/.config/nav-client/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    let base = std::env::var_os("APPDATA").map(PathBuf::from);

    #[cfg(not(target_os = "windows"))]
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")));

    base.map(|b| b.join("nav-client").join("config.toml"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
