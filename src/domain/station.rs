/// A rail station resolved from the Overpass response
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Station {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
        }
    }
}
