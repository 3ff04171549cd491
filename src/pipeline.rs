//! Turns an Overpass response into the finished result table

use crate::api::OverpassResponse;
use crate::domain::{MetroLine, PoiRecord};
use crate::geometry::{nearest_station, round_decimeters};
use crate::osm::{ExtractError, Extraction, MissingCoordinates, parse_elements};
use crate::output::ResultTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub assign_ids: bool,
    pub missing_coordinates: MissingCoordinates,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            assign_ids: true,
            missing_coordinates: MissingCoordinates::Skip,
        }
    }
}

/// Result of one run plus bookkeeping for the operator
#[derive(Debug)]
pub struct PipelineOutput {
    pub table: ResultTable,
    pub stations: usize,
    pub skipped: usize,
}

/// Match every candidate to its nearest station and categorize it
pub fn assemble_records(extraction: &Extraction) -> Result<Vec<PoiRecord>, ExtractError> {
    if extraction.stations.is_empty() && !extraction.pois.is_empty() {
        return Err(ExtractError::NoStations {
            pois: extraction.pois.len(),
        });
    }

    let mut records = Vec::with_capacity(extraction.pois.len());

    for poi in &extraction.pois {
        let Some((station, meters)) = nearest_station((poi.lat, poi.lon), &extraction.stations)
        else {
            continue;
        };

        records.push(PoiRecord {
            id: None,
            name: poi.name.clone(),
            category: poi.tags.category(),
            subcategory: poi.tags.subcategory(),
            lat: poi.lat,
            lon: poi.lon,
            nearest_station: station.name.clone(),
            distance_m: round_decimeters(meters),
        });
    }

    Ok(records)
}

/// Full extraction: split, match, categorize, dedup and number
pub fn run(
    response: &OverpassResponse,
    line: &MetroLine,
    options: PipelineOptions,
) -> Result<PipelineOutput, ExtractError> {
    let extraction = parse_elements(response, options.missing_coordinates)?;
    let records = assemble_records(&extraction)?;

    let mut table = ResultTable::from_records(records);
    if options.assign_ids {
        table.assign_ids(&line.id_prefix());
    }

    Ok(PipelineOutput {
        table,
        stations: extraction.stations.len(),
        skipped: extraction.skipped,
    })
}
