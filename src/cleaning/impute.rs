use crate::math::stats::mean;
use crate::records::{
    CLASS_KEY, CellValue, FILENAME_KEY, Feature, FeatureVector, LABEL_KEY, NUM_FEATURES,
    RawRecord, lookup,
};
use crate::schema::v1::CleaningStats;

/// A usable reading is finite and non-negative; everything else is missing.
pub fn valid_value(cell: Option<&CellValue>) -> Option<f64> {
    cell.and_then(CellValue::as_number).filter(|v| *v >= 0.0)
}

/// Per-column mean over valid readings. An all-missing column has mean 0.
pub fn column_means(records: &[RawRecord]) -> [f64; NUM_FEATURES] {
    let mut means = [0.0; NUM_FEATURES];
    let mut scratch = Vec::with_capacity(records.len());
    for feature in Feature::ALL {
        scratch.clear();
        scratch.extend(
            records
                .iter()
                .filter_map(|record| valid_value(lookup(record, feature.name()))),
        );
        means[feature.index()] = mean(&scratch);
    }
    means
}

/// NSP, or CLASS when NSP is not set. Fractions truncate; anything outside
/// 0..=3 is unknown (0). Labels are never imputed.
pub fn parse_label(record: &RawRecord) -> u8 {
    let cell = lookup(record, LABEL_KEY)
        .filter(|c| !c.is_unset())
        .or_else(|| lookup(record, CLASS_KEY).filter(|c| !c.is_unset()));
    match cell.and_then(CellValue::as_number).map(f64::trunc) {
        Some(v) if (0.0..=3.0).contains(&v) => v as u8,
        _ => 0,
    }
}

pub fn impute(records: &[RawRecord], stats: &mut CleaningStats) -> Vec<FeatureVector> {
    let means = column_means(records);
    records
        .iter()
        .map(|record| {
            let mut values = [0.0; NUM_FEATURES];
            let mut missing = false;
            for feature in Feature::ALL {
                let idx = feature.index();
                values[idx] = match valid_value(lookup(record, feature.name())) {
                    Some(v) => v,
                    None => {
                        missing = true;
                        stats.values_imputed += 1;
                        means[idx]
                    }
                };
            }
            if missing {
                stats.rows_with_missing_values += 1;
            }
            FeatureVector {
                values,
                nsp: parse_label(record),
                file_name: lookup(record, FILENAME_KEY).and_then(CellValue::to_display),
            }
        })
        .collect()
}
