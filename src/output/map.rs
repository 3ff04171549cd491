use anyhow::{Context, Result, bail};
use geo::{Centroid, MultiPoint, Point};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::csv::CsvRow;

const DEFAULT_ZOOM: u8 = 14;
const LEAFLET_VERSION: &str = "1.9.4";

#[derive(Debug, Serialize)]
struct Marker<'a> {
    lat: f64,
    lng: f64,
    name: &'a str,
    detail: String,
}

/// Default map path next to the CSV: `data.csv` -> `data_map.html`
pub fn default_map_path(csv_path: &Path) -> PathBuf {
    let stem = csv_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "export".to_string());
    csv_path.with_file_name(format!("{}_map.html", stem))
}

/// Mean position of all rows, used as the initial map view
pub fn map_center(rows: &[CsvRow]) -> Option<(f64, f64)> {
    let points: MultiPoint<f64> = rows.iter().map(|r| Point::new(r.lng, r.lat)).collect();
    points.centroid().map(|c| (c.y(), c.x()))
}

fn marker_detail(row: &CsvRow) -> String {
    let mut parts = Vec::new();

    match (&row.category, &row.subcategory) {
        (Some(c), Some(s)) => parts.push(format!("{} / {}", c, s)),
        (Some(c), None) => parts.push(c.clone()),
        (None, Some(s)) => parts.push(s.clone()),
        (None, None) => {}
    }
    if let Some(station) = &row.nearest_station {
        match row.distance_m {
            Some(d) => parts.push(format!("{:.1} m from {}", d, station)),
            None => parts.push(format!("Near {}", station)),
        }
    }

    parts.join(" · ")
}

/// Render a standalone Leaflet page with one marker per row
///
/// Names are inserted with `textContent`, so tags in OSM names stay inert.
pub fn render_map_html(rows: &[CsvRow], title: &str) -> Result<String> {
    let Some((lat, lng)) = map_center(rows) else {
        bail!("No rows to place on the map");
    };

    let markers: Vec<Marker> = rows
        .iter()
        .map(|r| Marker {
            lat: r.lat,
            lng: r.lng,
            name: &r.name,
            detail: marker_detail(r),
        })
        .collect();

    // "</" would end the inline script early
    let markers_json = serde_json::to_string(&markers)
        .context("Failed to serialize markers")?
        .replace("</", "<\\/");
    let title_json = serde_json::to_string(title)?.replace("</", "<\\/");

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Map Viewer</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@{version}/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@{version}/dist/leaflet.js"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
const markers = {markers};
document.title = {title};
const map = L.map("map").setView([{lat}, {lng}], {zoom});
L.tileLayer("https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png", {{
  maxZoom: 19,
  attribution: "&copy; OpenStreetMap contributors"
}}).addTo(map);
for (const m of markers) {{
  const popup = document.createElement("div");
  const name = document.createElement("strong");
  name.textContent = m.name;
  popup.appendChild(name);
  if (m.detail) {{
    const detail = document.createElement("div");
    detail.textContent = m.detail;
    popup.appendChild(detail);
  }}
  L.marker([m.lat, m.lng]).bindPopup(popup).addTo(map);
}}
</script>
</body>
</html>
"#,
        version = LEAFLET_VERSION,
        markers = markers_json,
        title = title_json,
        lat = lat,
        lng = lng,
        zoom = DEFAULT_ZOOM,
    ))
}

/// Render and write the map page
pub fn write_map(path: &Path, rows: &[CsvRow], title: &str) -> Result<()> {
    let html = render_map_html(rows, title)?;
    fs::write(path, html)
        .with_context(|| format!("Failed to write map file: {}", path.display()))
}
