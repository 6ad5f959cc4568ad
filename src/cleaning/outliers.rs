use tracing::debug;

use crate::math::stats::IqrBounds;
use crate::records::{Feature, FeatureVector};
use crate::schema::v1::{CleaningStats, ColumnBounds};

/// Caps one column to its own Tukey fences. Returns `None` when the column has
/// no usable values.
pub fn cap_column(features: &mut [FeatureVector], column: Feature) -> Option<ColumnBounds> {
    let mut values: Vec<f64> = features.iter().map(|f| f.get(column)).collect();
    let bounds = IqrBounds::from_values(&mut values)?;

    let mut capped = 0u64;
    for row in features.iter_mut() {
        let value = row.get(column);
        let clamped = bounds.clamp(value);
        if clamped != value {
            row.set(column, clamped);
            capped += 1;
        }
    }

    debug!(
        column = column.name(),
        lower = bounds.lower,
        upper = bounds.upper,
        capped,
        "column_capped"
    );
    Some(ColumnBounds {
        column: column.name().to_string(),
        q1: bounds.q1,
        q3: bounds.q3,
        lower: bounds.lower,
        upper: bounds.upper,
        capped,
    })
}

/// Critical columns are capped one after another against the current rows.
pub fn cap_outliers(features: &mut [FeatureVector], stats: &mut CleaningStats) -> Vec<ColumnBounds> {
    let mut out = Vec::with_capacity(Feature::CRITICAL.len());
    for column in Feature::CRITICAL {
        if let Some(bounds) = cap_column(features, column) {
            stats.outliers_capped += bounds.capped;
            out.push(bounds);
        }
    }
    out
}
