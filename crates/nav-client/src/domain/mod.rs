//! Domain layer for the client: configuration and error types.
//!
//! Nothing in here performs network I/O.  The only side effect is reading a
//! config file from disk in [`config::load_config_file`].

pub mod config;
pub mod errors;

pub use config::{ClientConfig, ClientConfigFile, ConfigError};
pub use errors::{ClientError, ConnectError, TransportError};
