use std::collections::HashSet;

use crate::records::{CellValue, Feature, RawRecord, lookup};
use crate::schema::v1::CleaningStats;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Component {
    Missing,
    Number(u64),
    Text(String),
}

impl Component {
    fn of(cell: Option<&CellValue>) -> Self {
        let Some(cell) = cell.filter(|c| !c.is_empty()) else {
            return Component::Missing;
        };
        match cell.as_number() {
            // -0.0 and 0.0 are the same reading.
            Some(v) if v == 0.0 => Component::Number(0f64.to_bits()),
            Some(v) => Component::Number(v.to_bits()),
            None => Component::Text(cell.to_display().unwrap_or_default()),
        }
    }
}

/// Identity of a row over the clinically meaningful subset (LB, AC, FM, UC,
/// ASTV). Provenance and label columns do not participate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint([Component; 5]);

impl Fingerprint {
    pub fn of(record: &RawRecord) -> Self {
        Self(Feature::FINGERPRINT.map(|f| Component::of(lookup(record, f.name()))))
    }
}

/// First occurrence wins; order is preserved.
pub fn dedup_rows(records: Vec<RawRecord>, stats: &mut CleaningStats) -> Vec<RawRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        if seen.insert(Fingerprint::of(&record)) {
            out.push(record);
        } else {
            stats.duplicates_removed += 1;
        }
    }
    out
}
