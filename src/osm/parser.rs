use crate::api::{Element, OverpassResponse};
use crate::domain::{PoiCandidate, PoiTags, Station};
use thiserror::Error;

const DEFAULT_NAME: &str = "Unnamed";

#[derive(Debug, Error, PartialEq)]
pub enum ExtractError {
    #[error("{kind} {id} has no usable coordinates")]
    MissingCoordinates { kind: String, id: u64 },
    #[error("found {pois} points of interest but no stations with coordinates")]
    NoStations { pois: usize },
}

/// Stations and POI candidates split out of one Overpass response
#[derive(Debug, Default)]
pub struct Extraction {
    pub stations: Vec<Station>,
    pub pois: Vec<PoiCandidate>,
    /// Elements dropped because no coordinate could be resolved
    pub skipped: usize,
}

/// How to treat an element without a coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingCoordinates {
    /// Drop the element and count it
    #[default]
    Skip,
    /// Abort the whole extraction
    Fail,
}

/// Resolve an element's position
///
/// Nodes carry `lat`/`lon` directly; ways and relations only have the
/// `center` emitted by `out center`. Direct fields win when both exist.
pub fn element_coordinates(element: &Element) -> Option<(f64, f64)> {
    match (element.lat, element.lon) {
        (Some(lat), Some(lon)) => Some((lat, lon)),
        _ => element.center.map(|c| (c.lat, c.lon)),
    }
}

/// Whether the element is a rail station or halt
pub fn is_station(element: &Element) -> bool {
    matches!(element.tag("railway"), Some("station" | "halt"))
}

/// Split a response into stations and point of interest candidates
pub fn parse_elements(
    response: &OverpassResponse,
    missing: MissingCoordinates,
) -> Result<Extraction, ExtractError> {
    let mut extraction = Extraction::default();

    for element in &response.elements {
        let Some((lat, lon)) = element_coordinates(element) else {
            if missing == MissingCoordinates::Fail {
                return Err(ExtractError::MissingCoordinates {
                    kind: element.type_.clone(),
                    id: element.id,
                });
            }
            extraction.skipped += 1;
            continue;
        };

        let name = element.tag("name").unwrap_or(DEFAULT_NAME).to_string();

        if is_station(element) {
            extraction.stations.push(Station::new(name, lat, lon));
        } else {
            let owned = |key: &str| element.tag(key).map(str::to_string);
            extraction.pois.push(PoiCandidate {
                name,
                tags: PoiTags {
                    amenity: owned("amenity"),
                    tourism: owned("tourism"),
                    leisure: owned("leisure"),
                },
                lat,
                lon,
            });
        }
    }

    Ok(extraction)
}
