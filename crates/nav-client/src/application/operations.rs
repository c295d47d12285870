//! Typed operation surface over the raw request/response call.
//!
//! Each operation does three things: check and stringify its arguments into
//! [`Params`], pick the [`OperationCode`], and hand both to
//! [`RequestChannel::call`].  The returned [`Response`] is passed through
//! untouched; callers decode the payload with the matching helper from
//! `nav_core::domain::payload` once they have checked the status.
//!
//! Parameter names and value formats follow the server's expectations:
//!
//! | Operation   | Parameters                                                   |
//! |-------------|--------------------------------------------------------------|
//! | AddLocation | `name`, `latitude`, `longitude`, `type`                      |
//! | AddRoad     | `sourceId`, `destId`, `distance`, `roadName`, `bidirectional`|
//! | FindPath    | `sourceId`, `destId`                                         |
//! | GetLocation | `id`                                                         |
//!
//! Decimal values are written with at least one fractional digit (`3.5`,
//! `12.0`); booleans as `1` / `0`.

use async_trait::async_trait;
use nav_core::protocol::{OperationCode, Params, Response};

use crate::domain::errors::ClientError;

/// Anything that can carry one request and bring back its response.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestChannel: Send {
    async fn call(&mut self, operation: OperationCode, params: Params)
        -> Result<Response, ClientError>;
}

/// One typed method per server capability.
///
/// Implemented for every [`RequestChannel`]; bring the trait into scope to
/// use the methods on a [`NavClient`](crate::NavClient).
#[async_trait]
pub trait NavigationOps: RequestChannel {
    /// Registers a new location.  The payload carries `id=N`.
    async fn add_location(
        &mut self,
        name: &str,
        latitude: f64,
        longitude: f64,
        kind: &str,
    ) -> Result<Response, ClientError> {
        let params = add_location_params(name, latitude, longitude, kind)?;
        self.call(OperationCode::AddLocation, params).await
    }

    /// Connects two locations.  The payload carries `id=N`.
    async fn add_road(
        &mut self,
        source_id: u64,
        dest_id: u64,
        distance_km: f64,
        road_name: &str,
        bidirectional: bool,
    ) -> Result<Response, ClientError> {
        let params = add_road_params(source_id, dest_id, distance_km, road_name, bidirectional)?;
        self.call(OperationCode::AddRoad, params).await
    }

    /// Asks for the shortest path.  Decode with `parse_path`.
    async fn find_path(&mut self, source_id: u64, dest_id: u64) -> Result<Response, ClientError> {
        self.call(OperationCode::FindPath, find_path_params(source_id, dest_id))
            .await
    }

    /// Lists every location.  Decode with `parse_locations`.
    async fn get_locations(&mut self) -> Result<Response, ClientError> {
        self.call(OperationCode::GetLocations, Params::new()).await
    }

    /// Lists every road.  Decode with `parse_roads`.
    async fn get_roads(&mut self) -> Result<Response, ClientError> {
        self.call(OperationCode::GetRoads, Params::new()).await
    }

    /// Fetches one location.  Decode with `parse_location_detail`.
    async fn get_location(&mut self, id: u64) -> Result<Response, ClientError> {
        self.call(OperationCode::GetLocation, get_location_params(id))
            .await
    }

    /// Seeds the server with its built-in sample graph.  Decode with
    /// `parse_sample_summary`.
    async fn init_sample_data(&mut self) -> Result<Response, ClientError> {
        self.call(OperationCode::InitSample, Params::new()).await
    }

    /// Asks the server to persist its graph to disk.
    async fn save_data(&mut self) -> Result<Response, ClientError> {
        self.call(OperationCode::SaveData, Params::new()).await
    }

    /// Asks the server to shut down.
    async fn shutdown_server(&mut self) -> Result<Response, ClientError> {
        self.call(OperationCode::Shutdown, Params::new()).await
    }
}

impl<T: RequestChannel + ?Sized> NavigationOps for T {}

// ── Parameter builders ────────────────────────────────────────────────────────

/// Parameters for [`OperationCode::AddLocation`].
///
/// # Errors
///
/// [`ClientError::InvalidArgument`] for a blank name or type, or coordinates
/// outside ±90° latitude / ±180° longitude.
pub fn add_location_params(
    name: &str,
    latitude: f64,
    longitude: f64,
    kind: &str,
) -> Result<Params, ClientError> {
    require_text("name", name)?;
    require_text("type", kind)?;
    require_range("latitude", latitude, 90.0)?;
    require_range("longitude", longitude, 180.0)?;

    Ok(Params::new()
        .with("name", name)
        .with("latitude", format_decimal(latitude))
        .with("longitude", format_decimal(longitude))
        .with("type", kind))
}

/// Parameters for [`OperationCode::AddRoad`].
///
/// # Errors
///
/// [`ClientError::InvalidArgument`] for a blank road name or a negative or
/// non-finite distance.
pub fn add_road_params(
    source_id: u64,
    dest_id: u64,
    distance_km: f64,
    road_name: &str,
    bidirectional: bool,
) -> Result<Params, ClientError> {
    require_text("roadName", road_name)?;
    if !distance_km.is_finite() || distance_km < 0.0 {
        return Err(ClientError::InvalidArgument(format!(
            "distance must be a non-negative number, got {distance_km}"
        )));
    }

    Ok(Params::new()
        .with("sourceId", source_id.to_string())
        .with("destId", dest_id.to_string())
        .with("distance", format_decimal(distance_km))
        .with("roadName", road_name)
        .with("bidirectional", if bidirectional { "1" } else { "0" }))
}

/// Parameters for [`OperationCode::FindPath`].
pub fn find_path_params(source_id: u64, dest_id: u64) -> Params {
    Params::new()
        .with("sourceId", source_id.to_string())
        .with("destId", dest_id.to_string())
}

/// Parameters for [`OperationCode::GetLocation`].
pub fn get_location_params(id: u64) -> Params {
    Params::new().with("id", id.to_string())
}

/// `3.5` → `"3.5"`, `12.0` → `"12.0"`.
fn format_decimal(value: f64) -> String {
    format!("{value:?}")
}

fn require_text(field: &str, value: &str) -> Result<(), ClientError> {
    if value.trim().is_empty() {
        return Err(ClientError::InvalidArgument(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_range(field: &str, value: f64, bound: f64) -> Result<(), ClientError> {
    if !value.is_finite() || value.abs() > bound {
        return Err(ClientError::InvalidArgument(format!(
            "{field} must be within ±{bound}, got {value}"
        )));
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
