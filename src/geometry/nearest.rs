use super::distance::haversine_m;
use crate::domain::Station;

/// Find the station closest to a point
///
/// Linear scan over all stations. On equal distances the first station wins.
///
/// # Returns
/// * `Some((station, meters))` - nearest station and the unrounded distance
/// * `None` - if `stations` is empty
pub fn nearest_station(point: (f64, f64), stations: &[Station]) -> Option<(&Station, f64)> {
    let mut best: Option<(&Station, f64)> = None;

    for station in stations {
        let d = haversine_m(point, (station.lat, station.lon));
        match best {
            Some((_, min)) if d >= min => {}
            _ => best = Some((station, d)),
        }
    }

    best
}
