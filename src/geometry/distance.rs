/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two WGS84 points using the haversine formula
///
/// # Arguments
/// * `a` - (lat, lon) in degrees
/// * `b` - (lat, lon) in degrees
///
/// # Returns
/// * Distance in meters
pub fn haversine_m(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lon1) = a;
    let (lat2, lon2) = b;

    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let h = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Round meters to one decimal place
pub fn round_decimeters(meters: f64) -> f64 {
    (meters * 10.0).round() / 10.0
}
