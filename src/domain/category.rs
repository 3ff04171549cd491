use std::fmt;

const FOOD_AMENITIES: &[&str] = &["restaurant", "cafe", "fast_food", "food_court"];
const CULTURE_TOURISM: &[&str] = &["museum", "gallery", "attraction"];
const ENTERTAINMENT_AMENITIES: &[&str] = &["cinema", "theatre", "nightclub"];
const ENTERTAINMENT_LEISURE: &[&str] = &["bowling_alley", "amusement_arcade"];
const LEISURE_LEISURE: &[&str] = &["park", "garden", "water_park"];

/// Top-level category assigned to every point of interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Food,
    Culture,
    Entertainment,
    Leisure,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Culture => "Culture",
            Category::Entertainment => "Entertainment",
            Category::Leisure => "Leisure",
            Category::Other => "Other",
        }
    }

    /// Classify raw amenity/tourism/leisure tag values
    ///
    /// Checked in order: food amenities, culture (tourism or arts centre),
    /// entertainment, general leisure. Anything else is `Other`.
    pub fn classify(amenity: Option<&str>, tourism: Option<&str>, leisure: Option<&str>) -> Self {
        let is_in = |value: Option<&str>, set: &[&str]| {
            value.is_some_and(|v| set.iter().any(|s| *s == v))
        };

        if is_in(amenity, FOOD_AMENITIES) {
            Category::Food
        } else if is_in(tourism, CULTURE_TOURISM) || amenity == Some("arts_centre") {
            Category::Culture
        } else if is_in(amenity, ENTERTAINMENT_AMENITIES)
            || is_in(leisure, ENTERTAINMENT_LEISURE)
        {
            Category::Entertainment
        } else if is_in(leisure, LEISURE_LEISURE) {
            Category::Leisure
        } else {
            Category::Other
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable subcategory from the first non-empty raw tag
///
/// `fast_food` becomes `Fast Food`. Falls back to `General`.
pub fn subcategory(amenity: Option<&str>, tourism: Option<&str>, leisure: Option<&str>) -> String {
    [amenity, tourism, leisure]
        .into_iter()
        .flatten()
        .find(|v| !v.is_empty())
        .map(humanize)
        .unwrap_or_else(|| "General".to_string())
}

fn humanize(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    let mut word_start = true;

    for ch in tag.replace('_', " ").chars() {
        if ch.is_alphabetic() {
            if word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            word_start = false;
        } else {
            out.push(ch);
            word_start = true;
        }
    }

    out
}
