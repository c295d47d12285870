//! Mini Maps navigation client: command-line entry point.
//!
//! Connects to the navigation server, runs exactly one operation, prints the
//! result, and disconnects.
//!
//! # Usage
//!
//! ```text
//! nav-client [OPTIONS] <COMMAND>
//!
//! Commands:
//!   add-location  Register a location
//!   add-road      Connect two locations
//!   find-path     Shortest path between two locations
//!   locations     List all locations
//!   roads         List all roads
//!   location      Show one location
//!   init-sample   Load the server's sample graph
//!   save          Persist the server's graph to disk
//!   shutdown      Stop the server
//! ```
//!
//! # Configuration precedence
//!
//! Highest first: command-line flags, environment variables, the TOML config
//! file (`--config`, or the platform default location), built-in defaults.
//!
//! | Variable              | Flag                | Default        |
//! |-----------------------|---------------------|----------------|
//! | `NAV_HOST`            | `--host`            | `127.0.0.1`    |
//! | `NAV_PORT`            | `--port`            | `8080`         |
//! | `NAV_CONNECT_TIMEOUT` | `--connect-timeout` | `5000` ms      |
//! | `NAV_READ_TIMEOUT`    | `--read-timeout`    | `5000` ms      |
//! | `NAV_CONFIG`          | `--config`          | platform path  |
//! | `NAV_STRICT_SEQUENCE` | `--strict-sequence` | off            |
//!
//! # Exit status
//!
//! `0` when the server reports success, `1` when it answers with a failure
//! status, `2` when the server cannot be reached or the exchange fails.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nav_client::application::operations::{NavigationOps, RequestChannel};
use nav_client::domain::config::{default_config_path, load_config_file, ClientConfigFile};
use nav_client::domain::ClientConfig;
use nav_client::{ClientError, NavClient};
use nav_core::domain::payload::{
    parse_created_id, parse_location_detail, parse_locations, parse_path, parse_roads,
    parse_sample_summary, PayloadError,
};
use nav_core::Response;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Command-line client for the Mini Maps navigation server.
#[derive(Debug, Parser)]
#[command(name = "nav-client", about = "Command-line client for the Mini Maps navigation server", version)]
struct Cli {
    /// Server hostname or IP address.
    #[arg(long, env = "NAV_HOST")]
    host: Option<String>,

    /// Server TCP port.
    #[arg(long, env = "NAV_PORT")]
    port: Option<u16>,

    /// Connect timeout in milliseconds.
    #[arg(long, value_name = "MS", env = "NAV_CONNECT_TIMEOUT")]
    connect_timeout: Option<u64>,

    /// Per-response read timeout in milliseconds.
    #[arg(long, value_name = "MS", env = "NAV_READ_TIMEOUT")]
    read_timeout: Option<u64>,

    /// Path to a TOML config file.
    #[arg(long, env = "NAV_CONFIG")]
    config: Option<PathBuf>,

    /// Reject responses whose sequence number does not match the request.
    #[arg(long, env = "NAV_STRICT_SEQUENCE")]
    strict_sequence: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
enum Command {
    /// Register a location.
    AddLocation {
        name: String,
        #[arg(long, allow_negative_numbers = true)]
        latitude: f64,
        #[arg(long, allow_negative_numbers = true)]
        longitude: f64,
        /// Category such as `park` or `station`.
        #[arg(long = "type", default_value = "landmark")]
        kind: String,
    },
    /// Connect two locations with a road.
    AddRoad {
        source_id: u64,
        dest_id: u64,
        /// Length in kilometres.
        distance: f64,
        name: String,
        /// Only allow travel from source to destination.
        #[arg(long)]
        one_way: bool,
    },
    /// Shortest path between two locations.
    FindPath { source_id: u64, dest_id: u64 },
    /// List all locations.
    Locations,
    /// List all roads.
    Roads,
    /// Show one location.
    Location { id: u64 },
    /// Load the server's sample graph.
    InitSample,
    /// Persist the server's graph to disk.
    Save,
    /// Stop the server.
    Shutdown,
}

impl Cli {
    /// Layers the flags over the config file over the defaults.
    fn into_client_config(self) -> anyhow::Result<(ClientConfig, Command)> {
        let file = match self.config.clone().or_else(default_config_path) {
            Some(path) => load_config_file(&path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => ClientConfigFile::default(),
        };
        let mut config = ClientConfig::from(file);

        if let Some(host) = self.host {
            config.server_host = host;
        }
        if let Some(port) = self.port {
            config.server_port = port;
        }
        if let Some(ms) = self.connect_timeout {
            config.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.read_timeout {
            config.read_timeout = Duration::from_millis(ms);
        }
        if self.strict_sequence {
            config.strict_sequence = true;
        }

        Ok((config, self.command))
    }
}

// ── Command execution ─────────────────────────────────────────────────────────

/// Maps one subcommand onto the typed operation surface.
async fn execute<R>(channel: &mut R, command: &Command) -> Result<Response, ClientError>
where
    R: RequestChannel + ?Sized,
{
    match command {
        Command::AddLocation {
            name,
            latitude,
            longitude,
            kind,
        } => channel.add_location(name, *latitude, *longitude, kind).await,
        Command::AddRoad {
            source_id,
            dest_id,
            distance,
            name,
            one_way,
        } => {
            channel
                .add_road(*source_id, *dest_id, *distance, name, !*one_way)
                .await
        }
        Command::FindPath { source_id, dest_id } => channel.find_path(*source_id, *dest_id).await,
        Command::Locations => channel.get_locations().await,
        Command::Roads => channel.get_roads().await,
        Command::Location { id } => channel.get_location(*id).await,
        Command::InitSample => channel.init_sample_data().await,
        Command::Save => channel.save_data().await,
        Command::Shutdown => channel.shutdown_server().await,
    }
}

/// Formats a successful response for the terminal.
///
/// # Errors
///
/// Returns the [`PayloadError`] if the payload does not match the
/// operation's format.
fn render_success(command: &Command, response: &Response) -> Result<String, PayloadError> {
    let payload = response.payload.as_str();
    let text = match command {
        Command::AddLocation { .. } => format!("Location added with ID {}", parse_created_id(payload)?),
        Command::AddRoad { .. } => format!("Road added with ID {}", parse_created_id(payload)?),
        Command::FindPath { .. } => {
            let path = parse_path(payload)?;
            format!(
                "Route: {} ({:.2} km)",
                path.route_text().replace("->", " -> "),
                path.distance
            )
        }
        Command::Locations => {
            let locations = parse_locations(payload)?;
            let mut out = format!("{} locations", locations.len());
            for loc in locations {
                out.push_str(&format!("\n  {:>4}  {}", loc.id, loc.name));
            }
            out
        }
        Command::Roads => {
            let roads = parse_roads(payload)?;
            let mut out = format!("{} roads", roads.len());
            for road in roads {
                out.push_str(&format!(
                    "\n  {:>4}  {} -> {}  {} km",
                    road.id, road.source_id, road.dest_id, road.distance_km
                ));
            }
            out
        }
        Command::Location { .. } => {
            let loc = parse_location_detail(payload)?;
            format!(
                "#{} {} ({}, {}) [{}]",
                loc.id, loc.name, loc.latitude, loc.longitude, loc.kind
            )
        }
        Command::InitSample => {
            let summary = parse_sample_summary(payload)?;
            format!(
                "Sample data loaded: {} locations, {} roads",
                summary.locations, summary.roads
            )
        }
        Command::Save | Command::Shutdown => response.message.clone(),
    };
    Ok(text)
}

/// User-facing line for a failed call.
///
/// Channel failures get a generic prefix so they read differently from a
/// failure status reported by the server.
fn describe_error(error: &ClientError) -> String {
    if error.is_communication_failure() {
        format!("communication failure: {error}")
    } else {
        error.to_string()
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (config, command) = Cli::parse().into_client_config()?;
    info!("nav-client targeting {}", config.server_endpoint());

    let mut client = NavClient::from_config(config);
    let (session_id, welcome) = match client.connect().await {
        Ok(accepted) => accepted,
        Err(e) => {
            eprintln!("could not connect to {}: {e}", client.endpoint());
            return Ok(ExitCode::from(2));
        }
    };
    info!("session {session_id}: {welcome}");

    let outcome = execute(&mut client, &command).await;
    client.disconnect();

    let code = match outcome {
        Ok(response) if response.is_success() => {
            match render_success(&command, &response) {
                Ok(text) => println!("{text}"),
                Err(e) => {
                    warn!("unexpected payload {:?}: {e}", response.payload);
                    println!("{}", response.message);
                }
            }
            ExitCode::SUCCESS
        }
        Ok(response) => {
            eprintln!("{}", response.message);
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("{}", describe_error(&e));
            if e.is_communication_failure() {
                ExitCode::from(2)
            } else {
                ExitCode::from(1)
            }
        }
    };
    Ok(code)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
