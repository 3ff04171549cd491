use std::collections::HashSet;

use crate::domain::PoiRecord;

/// Ordered result rows, unique by (name, lat, lon)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    rows: Vec<PoiRecord>,
}

impl ResultTable {
    /// Build a table, dropping later duplicates of the same (name, lat, lon)
    pub fn from_records(records: Vec<PoiRecord>) -> Self {
        Self {
            rows: dedup_records(records),
        }
    }

    /// Assign `{prefix}{n:04}` identifiers in row order, starting at 1
    pub fn assign_ids(&mut self, prefix: &str) {
        for (i, row) in self.rows.iter_mut().enumerate() {
            row.id = Some(format!("{}{:04}", prefix, i + 1));
        }
    }

    pub fn has_ids(&self) -> bool {
        self.rows.iter().any(|r| r.id.is_some())
    }

    pub fn rows(&self) -> &[PoiRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Keep the first occurrence of each (name, lat, lon)
pub fn dedup_records(records: Vec<PoiRecord>) -> Vec<PoiRecord> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(records.len());

    for record in records {
        let (name, lat, lon) = record.dedup_key();
        if seen.insert((name.to_string(), lat, lon)) {
            unique.push(record);
        }
    }

    unique
}
