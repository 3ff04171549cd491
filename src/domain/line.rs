use std::collections::BTreeMap;

/// A metro line and the OSM names of its stations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetroLine {
    pub name: String,
    pub stations: Vec<String>,
}

impl MetroLine {
    pub fn new(name: impl Into<String>, stations: Vec<String>) -> Self {
        Self {
            name: name.into(),
            stations,
        }
    }

    /// Station names joined into a regex alternation for the `name~` filter
    pub fn station_pattern(&self) -> String {
        self.stations.join("|")
    }

    /// Two-letter uppercase prefix used for row IDs, e.g. `KA` for "Kajang Line"
    pub fn id_prefix(&self) -> String {
        self.name.chars().take(2).flat_map(char::to_uppercase).collect()
    }
}

const KAJANG_LINE: &[&str] = &[
    "Kwasa Damansara",
    "Kwasa Sentral",
    "Kota Damansara",
    "Surian",
    "Mutiara Damansara",
    "Bandar Utama",
    "Taman Tun Dr Ismail",
    "Phileo Damansara",
    "Pusat Bandar Damansara",
    "Semantan",
    "Muzium Negara",
    "Pasar Seni",
    "Merdeka",
    "Bukit Bintang",
    "Tun Razak Exchange",
    "Cochrane",
    "Maluri",
    "Taman Pertama",
    "Taman Midah",
    "Taman Mutiara",
    "Taman Connaught",
    "Taman Suntex",
    "Sri Raya",
    "Bandar Tun Hussein Onn",
    "Batu 11 Cheras",
    "Bukit Dukung",
    "Sungai Jernih",
    "Stadium Kajang",
    "Kajang",
];

const KELANA_JAYA_LINE: &[&str] = &[
    "Gombak",
    "Taman Melati",
    "Wangsa Maju",
    "Sri Rampai",
    "Setiawangsa",
    "Jelatek",
    "Dato'Keramat",
    "Damai",
    "Ampang Park",
    "KLCC",
    "Kampung Baru",
    "Dang Wangi",
    "Masjid Jamek",
    "Pasar Seni",
    "KL Sentral",
    "Bangsar",
    "Abdullah Hukum",
    "Kerinchi",
    "Universiti",
    "Taman Jaya",
    "Asia Jaya",
    "Taman Paramount",
    "Taman Bahagia",
    "Kelana Jaya",
    "Lembah Subang",
    "Ara Damansara",
    "Glenmarie",
    "Subang Jaya",
    "SS 15",
    "SS18",
    "USJ 7",
    "Taipan",
    "Wawasan",
    "USJ21",
    "Alam Megah",
    "Subang Alam",
    "Putra Heights",
];

/// Named lines available for extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineCatalog {
    lines: BTreeMap<String, Vec<String>>,
}

impl LineCatalog {
    pub fn new(lines: BTreeMap<String, Vec<String>>) -> Self {
        Self { lines }
    }

    /// Kajang Line and Kelana Jaya Line
    pub fn builtin() -> Self {
        let owned = |names: &[&str]| names.iter().map(|s| s.to_string()).collect();
        let mut lines = BTreeMap::new();
        lines.insert("Kajang Line".to_string(), owned(KAJANG_LINE));
        lines.insert("Kelana Jaya Line".to_string(), owned(KELANA_JAYA_LINE));
        Self { lines }
    }

    /// Look up a line by name, ignoring ASCII case
    pub fn get(&self, name: &str) -> Option<MetroLine> {
        self.lines
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(k, v)| MetroLine::new(k.clone(), v.clone()))
    }

    /// Line used when none is named; catalog order is alphabetical
    pub fn first(&self) -> Option<MetroLine> {
        self.iter().next()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.lines.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = MetroLine> + '_ {
        self.lines
            .iter()
            .map(|(k, v)| MetroLine::new(k.clone(), v.clone()))
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
