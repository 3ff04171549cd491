use super::category::{Category, subcategory};

/// Raw category tags carried over from the OSM element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoiTags {
    pub amenity: Option<String>,
    pub tourism: Option<String>,
    pub leisure: Option<String>,
}

impl PoiTags {
    pub fn category(&self) -> Category {
        Category::classify(
            self.amenity.as_deref(),
            self.tourism.as_deref(),
            self.leisure.as_deref(),
        )
    }

    pub fn subcategory(&self) -> String {
        subcategory(
            self.amenity.as_deref(),
            self.tourism.as_deref(),
            self.leisure.as_deref(),
        )
    }
}

/// A point of interest candidate before station matching
#[derive(Debug, Clone, PartialEq)]
pub struct PoiCandidate {
    pub name: String,
    pub tags: PoiTags,
    pub lat: f64,
    pub lon: f64,
}

/// A fully derived output row
#[derive(Debug, Clone, PartialEq)]
pub struct PoiRecord {
    pub id: Option<String>,
    pub name: String,
    pub category: Category,
    pub subcategory: String,
    pub lat: f64,
    pub lon: f64,
    pub nearest_station: String,
    /// Meters, rounded to one decimal place
    pub distance_m: f64,
}

impl PoiRecord {
    /// Key used for deduplication: name plus exact coordinates
    pub fn dedup_key(&self) -> (&str, u64, u64) {
        (&self.name, self.lat.to_bits(), self.lon.to_bits())
    }
}
