use tracing::debug;

use crate::records::{CellValue, Feature, RawRecord, lookup};
use crate::schema::v1::CleaningStats;

#[derive(Debug)]
pub enum Validation {
    /// Nothing was handed in; distinct from "everything was invalid".
    NoData,
    Rows(Vec<RawRecord>),
}

pub fn is_valid_row(record: &RawRecord) -> bool {
    Feature::REQUIRED.iter().all(|feature| {
        lookup(record, feature.name())
            .and_then(CellValue::as_number)
            .is_some()
    })
}

pub fn validate_rows(records: Vec<RawRecord>, stats: &mut CleaningStats) -> Validation {
    if records.is_empty() {
        return Validation::NoData;
    }
    let before = records.len();
    let kept: Vec<RawRecord> = records.into_iter().filter(is_valid_row).collect();
    let removed = (before - kept.len()) as u64;
    stats.rows_removed += removed;
    debug!(kept = kept.len(), removed, "rows_validated");
    Validation::Rows(kept)
}
