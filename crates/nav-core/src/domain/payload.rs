//! Decoders for operation-specific response payloads.
//!
//! | Operation     | Payload                                          |
//! |---------------|--------------------------------------------------|
//! | AddLocation   | `id=N`                                           |
//! | AddRoad       | `id=N`                                           |
//! | FindPath      | `path=Home(1)->Park(3);distance=12.34`           |
//! | GetLocations  | `count=N;locations=1:Home,3:Park`                |
//! | GetRoads      | `count=N;roads=1:1->3(2.5km),2:3->4(1km)`         |
//! | GetLocation   | `ID: 1, Name: Home, Lat: 1.5, Lon: 2.5, Type: x` |
//! | InitSample    | `locations=5;roads=7`                            |
//!
//! Most payloads are `;`-separated `key=value` fields.  The server does not
//! escape names inside listings, so a location name containing `,` splits
//! into two listing entries; names are kept free of separators on the way in.

use thiserror::Error;

/// Errors produced while decoding a payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// A required `key=value` field is absent.
    #[error("payload is missing field {0:?}")]
    MissingField(&'static str),

    /// A numeric value failed to parse.
    #[error("field {field:?} has non-numeric value {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    /// A listing entry does not have the expected shape.
    #[error("invalid listing entry {0:?}")]
    InvalidEntry(String),

    /// The declared `count` disagrees with the number of entries.
    #[error("payload declares {declared} entries but lists {actual}")]
    CountMismatch { declared: usize, actual: usize },
}

// ── Payload types ─────────────────────────────────────────────────────────────

/// One row of a `GetLocations` listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationEntry {
    pub id: u64,
    pub name: String,
}

/// One row of a `GetRoads` listing.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadEntry {
    pub id: u64,
    pub source_id: u64,
    pub dest_id: u64,
    pub distance_km: f64,
}

/// One stop on a path returned by `FindPath`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathHop {
    pub name: String,
    /// Present when the server printed the hop as `Name(id)`.
    pub location_id: Option<u64>,
}

/// A shortest path and its total distance.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSummary {
    pub hops: Vec<PathHop>,
    pub distance: f64,
}

impl PathSummary {
    /// Renders the hop names joined with `->`.
    pub fn route_text(&self) -> String {
        self.hops
            .iter()
            .map(|h| h.name.as_str())
            .collect::<Vec<_>>()
            .join("->")
    }
}

/// Full record returned by `GetLocation`.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationDetail {
    pub id: u64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Free-form category such as `park` or `station`.
    pub kind: String,
}

/// Counts reported by `InitSample`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleSummary {
    pub locations: u64,
    pub roads: u64,
}

// ── Decoders ──────────────────────────────────────────────────────────────────

/// Decodes the `id=N` payload of `AddLocation` and `AddRoad`.
pub fn parse_created_id(payload: &str) -> Result<u64, PayloadError> {
    let fields = split_fields(payload);
    parse_number(require(&fields, "id")?, "id")
}

/// Decodes a `GetLocations` payload.
///
/// # Examples
///
/// ```rust
/// use nav_core::domain::payload::{parse_locations, LocationEntry};
///
/// let locs = parse_locations("count=1;locations=4:Harbor").unwrap();
/// assert_eq!(locs, vec![LocationEntry { id: 4, name: "Harbor".into() }]);
/// ```
pub fn parse_locations(payload: &str) -> Result<Vec<LocationEntry>, PayloadError> {
    let fields = split_fields(payload);
    let listing = require(&fields, "locations")?;

    let entries = split_listing(listing)
        .map(|entry| -> Result<LocationEntry, PayloadError> {
            let (id, name) = entry
                .split_once(':')
                .ok_or_else(|| PayloadError::InvalidEntry(entry.to_string()))?;
            Ok(LocationEntry {
                id: parse_number(id, "locations")?,
                name: name.to_string(),
            })
        })
        .collect::<Result<Vec<_>, PayloadError>>()?;

    check_count(&fields, entries.len())?;
    Ok(entries)
}

/// Decodes a `GetRoads` payload of `id:src->dst(distancekm)` entries.
pub fn parse_roads(payload: &str) -> Result<Vec<RoadEntry>, PayloadError> {
    let fields = split_fields(payload);
    let listing = require(&fields, "roads")?;

    let entries = split_listing(listing)
        .map(parse_road_entry)
        .collect::<Result<Vec<_>, PayloadError>>()?;

    check_count(&fields, entries.len())?;
    Ok(entries)
}

/// Decodes a `FindPath` payload.
///
/// Hops may be written `Name(id)` or just `Name`.
pub fn parse_path(payload: &str) -> Result<PathSummary, PayloadError> {
    let fields = split_fields(payload);
    let path = require(&fields, "path")?;
    let distance = parse_float(require(&fields, "distance")?, "distance")?;

    let hops = if path.is_empty() {
        Vec::new()
    } else {
        path.split("->").map(parse_hop).collect()
    };

    Ok(PathSummary { hops, distance })
}

/// Decodes a `GetLocation` payload of the form
/// `ID: 1, Name: Home, Lat: 1.5, Lon: 2.5, Type: house`.
///
/// Labels after the name are located from the right so that a name
/// containing `, ` still decodes.
pub fn parse_location_detail(payload: &str) -> Result<LocationDetail, PayloadError> {
    let rest = payload
        .trim()
        .strip_prefix("ID: ")
        .ok_or(PayloadError::MissingField("ID"))?;
    let (id, rest) = rest
        .split_once(", Name: ")
        .ok_or(PayloadError::MissingField("Name"))?;
    let (rest, kind) = rest
        .rsplit_once(", Type: ")
        .ok_or(PayloadError::MissingField("Type"))?;
    let (rest, lon) = rest
        .rsplit_once(", Lon: ")
        .ok_or(PayloadError::MissingField("Lon"))?;
    let (name, lat) = rest
        .rsplit_once(", Lat: ")
        .ok_or(PayloadError::MissingField("Lat"))?;

    Ok(LocationDetail {
        id: parse_number(id, "ID")?,
        name: name.to_string(),
        latitude: parse_float(lat, "Lat")?,
        longitude: parse_float(lon, "Lon")?,
        kind: kind.to_string(),
    })
}

/// Decodes the `locations=N;roads=M` payload of `InitSample`.
pub fn parse_sample_summary(payload: &str) -> Result<SampleSummary, PayloadError> {
    let fields = split_fields(payload);
    Ok(SampleSummary {
        locations: parse_number(require(&fields, "locations")?, "locations")?,
        roads: parse_number(require(&fields, "roads")?, "roads")?,
    })
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Splits `k1=v1;k2=v2` into pairs.  Segments without `=` are skipped.
fn split_fields(payload: &str) -> Vec<(&str, &str)> {
    payload
        .split(';')
        .filter_map(|segment| segment.split_once('='))
        .map(|(k, v)| (k.trim(), v))
        .collect()
}

fn require<'a>(fields: &[(&str, &'a str)], key: &'static str) -> Result<&'a str, PayloadError> {
    fields
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .ok_or(PayloadError::MissingField(key))
}

fn split_listing(listing: &str) -> impl Iterator<Item = &str> {
    listing.split(',').filter(|entry| !entry.is_empty())
}

fn check_count(fields: &[(&str, &str)], actual: usize) -> Result<(), PayloadError> {
    let Some(declared) = fields.iter().find(|(k, _)| *k == "count").map(|(_, v)| *v) else {
        return Ok(());
    };
    let declared: usize = declared.trim().parse().map_err(|_| PayloadError::InvalidNumber {
        field: "count",
        value: declared.to_string(),
    })?;
    if declared != actual {
        return Err(PayloadError::CountMismatch { declared, actual });
    }
    Ok(())
}

fn parse_road_entry(entry: &str) -> Result<RoadEntry, PayloadError> {
    let invalid = || PayloadError::InvalidEntry(entry.to_string());

    let (id, rest) = entry.split_once(':').ok_or_else(invalid)?;
    let (source, rest) = rest.split_once("->").ok_or_else(invalid)?;
    let (dest, rest) = rest.split_once('(').ok_or_else(invalid)?;
    let distance = rest
        .strip_suffix(')')
        .ok_or_else(invalid)?
        .trim_end_matches("km");

    Ok(RoadEntry {
        id: parse_number(id, "roads")?,
        source_id: parse_number(source, "roads")?,
        dest_id: parse_number(dest, "roads")?,
        distance_km: parse_float(distance, "roads")?,
    })
}

fn parse_hop(hop: &str) -> PathHop {
    let hop = hop.trim();
    let with_id = hop
        .strip_suffix(')')
        .and_then(|inner| inner.rsplit_once('('))
        .and_then(|(name, id)| id.parse::<u64>().ok().map(|id| (name, id)));

    match with_id {
        Some((name, id)) => PathHop {
            name: name.to_string(),
            location_id: Some(id),
        },
        None => PathHop {
            name: hop.to_string(),
            location_id: None,
        },
    }
}

fn parse_number(value: &str, field: &'static str) -> Result<u64, PayloadError> {
    value.trim().parse().map_err(|_| PayloadError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

fn parse_float(value: &str, field: &'static str) -> Result<f64, PayloadError> {
    value.trim().parse().map_err(|_| PayloadError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Locations ─────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_locations_two_entries() {
        // Act
        let locs = parse_locations("count=2;locations=1:Alpha,2:Beta").unwrap();

        // Assert
        let pairs: Vec<(u64, &str)> = locs.iter().map(|l| (l.id, l.name.as_str())).collect();
        assert_eq!(pairs, vec![(1, "Alpha"), (2, "Beta")]);
    }

    #[test]
    fn test_parse_locations_empty_listing() {
        assert!(parse_locations("count=0;locations=").unwrap().is_empty());
    }

    #[test]
    fn test_parse_locations_name_may_contain_colon() {
        let locs = parse_locations("count=1;locations=7:Gate: North").unwrap();
        assert_eq!(locs[0].name, "Gate: North");
    }

    #[test]
    fn test_parse_locations_missing_listing_field() {
        assert_eq!(
            parse_locations("count=2"),
            Err(PayloadError::MissingField("locations"))
        );
    }

    #[test]
    fn test_parse_locations_count_mismatch() {
        assert_eq!(
            parse_locations("count=3;locations=1:A,2:B"),
            Err(PayloadError::CountMismatch {
                declared: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_parse_locations_entry_without_colon() {
        assert!(matches!(
            parse_locations("locations=Alpha"),
            Err(PayloadError::InvalidEntry(_))
        ));
    }

    // ── Roads ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_roads_server_format() {
        let roads = parse_roads("count=2;roads=1:1->2(2.5km),2:2->3(10km)").unwrap();
        assert_eq!(
            roads,
            vec![
                RoadEntry {
                    id: 1,
                    source_id: 1,
                    dest_id: 2,
                    distance_km: 2.5
                },
                RoadEntry {
                    id: 2,
                    source_id: 2,
                    dest_id: 3,
                    distance_km: 10.0
                },
            ]
        );
    }

    #[test]
    fn test_parse_roads_rejects_malformed_entry() {
        assert!(matches!(
            parse_roads("count=1;roads=1:1-2(3km)"),
            Err(PayloadError::InvalidEntry(_))
        ));
    }

    // ── Path ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_path_plain_names() {
        let path = parse_path("path=A->B->C;distance=12.34").unwrap();
        assert_eq!(path.route_text(), "A->B->C");
        assert_eq!(path.distance, 12.34);
        assert!(path.hops.iter().all(|h| h.location_id.is_none()));
    }

    #[test]
    fn test_parse_path_hops_with_ids() {
        let path = parse_path("path=Home(1)->City Park(3);distance=4.50").unwrap();
        assert_eq!(
            path.hops,
            vec![
                PathHop {
                    name: "Home".into(),
                    location_id: Some(1)
                },
                PathHop {
                    name: "City Park".into(),
                    location_id: Some(3)
                },
            ]
        );
        assert_eq!(path.distance, 4.5);
    }

    #[test]
    fn test_parse_path_missing_distance() {
        assert_eq!(
            parse_path("path=A->B"),
            Err(PayloadError::MissingField("distance"))
        );
    }

    #[test]
    fn test_parse_path_bad_distance() {
        assert!(matches!(
            parse_path("path=A;distance=far"),
            Err(PayloadError::InvalidNumber { field: "distance", .. })
        ));
    }

    // ── Location detail ───────────────────────────────────────────────────────

    #[test]
    fn test_parse_location_detail() {
        let loc =
            parse_location_detail("ID: 3, Name: Central Station, Lat: 40.75, Lon: -73.99, Type: station")
                .unwrap();
        assert_eq!(loc.id, 3);
        assert_eq!(loc.name, "Central Station");
        assert_eq!(loc.latitude, 40.75);
        assert_eq!(loc.longitude, -73.99);
        assert_eq!(loc.kind, "station");
    }

    #[test]
    fn test_parse_location_detail_name_with_comma() {
        let loc = parse_location_detail("ID: 1, Name: Park, North, Lat: 1, Lon: 2, Type: park")
            .unwrap();
        assert_eq!(loc.name, "Park, North");
    }

    #[test]
    fn test_parse_location_detail_missing_label() {
        assert_eq!(
            parse_location_detail("ID: 1, Name: X, Lat: 1, Lon: 2"),
            Err(PayloadError::MissingField("Type"))
        );
    }

    // ── Created id / sample ───────────────────────────────────────────────────

    #[test]
    fn test_parse_created_id() {
        assert_eq!(parse_created_id("id=17"), Ok(17));
        assert_eq!(parse_created_id(""), Err(PayloadError::MissingField("id")));
    }

    #[test]
    fn test_parse_sample_summary() {
        assert_eq!(
            parse_sample_summary("locations=5;roads=7"),
            Ok(SampleSummary {
                locations: 5,
                roads: 7
            })
        );
    }
}
