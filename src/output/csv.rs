use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::table::ResultTable;

const COLUMNS: [&str; 7] = [
    "Name",
    "Category",
    "Subcategory",
    "lat",
    "lng",
    "Nearest Station",
    "Distance (m)",
];

/// One row read back from an exported file
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CsvRow {
    #[serde(rename = "ID", default)]
    pub id: Option<String>,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Category", default)]
    pub category: Option<String>,
    #[serde(rename = "Subcategory", default)]
    pub subcategory: Option<String>,
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "Nearest Station", default)]
    pub nearest_station: Option<String>,
    #[serde(rename = "Distance (m)", default)]
    pub distance_m: Option<f64>,
}

/// Append `.csv` when the path has no extension
pub fn with_csv_extension(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension("csv")
    }
}

/// Serialize a table as CSV; the `ID` column is present only when rows carry IDs
pub fn write_table<W: Write>(writer: W, table: &ResultTable) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let with_ids = table.has_ids();

    let mut header: Vec<&str> = Vec::with_capacity(COLUMNS.len() + 1);
    if with_ids {
        header.push("ID");
    }
    header.extend(COLUMNS);
    wtr.write_record(&header)?;

    for row in table.rows() {
        let mut record = Vec::with_capacity(header.len());
        if with_ids {
            record.push(row.id.clone().unwrap_or_default());
        }
        record.extend([
            row.name.clone(),
            row.category.to_string(),
            row.subcategory.clone(),
            row.lat.to_string(),
            row.lon.to_string(),
            row.nearest_station.clone(),
            format!("{:.1}", row.distance_m),
        ]);
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write a table to a CSV file
pub fn write_csv(path: &Path, table: &ResultTable) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    write_table(file, table)
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))
}

/// Write a table to a CSV file, dumping it to `fallback` when the file write fails
///
/// The original write error is still returned after the dump.
pub fn write_csv_or_dump<W: Write>(path: &Path, table: &ResultTable, fallback: W) -> Result<()> {
    let Err(err) = write_csv(path, table) else {
        return Ok(());
    };
    if let Err(dump_err) = write_table(fallback, table) {
        return Err(err.context(format!("Fallback dump also failed: {}", dump_err)));
    }
    Err(err)
}

/// Read a previously exported file
///
/// Only `Name`, `lat` and `lng` are required, so hand-edited files and files
/// without IDs load as well.
pub fn read_csv(path: &Path) -> Result<Vec<CsvRow>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
    let mut rdr = csv::ReaderBuilder::new().from_reader(file);

    rdr.deserialize::<CsvRow>()
        .enumerate()
        .map(|(i, row)| {
            row.with_context(|| format!("Invalid row {} in {}", i + 1, path.display()))
        })
        .collect()
}
