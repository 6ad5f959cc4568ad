use kira_ctgqc::cleaning::outliers::{cap_column, cap_outliers};
use kira_ctgqc::math::stats::{IqrBounds, quantile_at_index};
use kira_ctgqc::records::{Feature, FeatureVector, NUM_FEATURES};
use kira_ctgqc::schema::v1::CleaningStats;

fn with(feature: Feature, values: &[f64]) -> Vec<FeatureVector> {
    values
        .iter()
        .map(|v| {
            let mut f = FeatureVector::new([0.0; NUM_FEATURES]);
            f.set(feature, *v);
            f
        })
        .collect()
}

#[test]
fn extreme_baseline_is_capped_to_index_quartile_fence() {
    let mut rows = with(Feature::Lb, &[90.0, 100.0, 105.0, 110.0, 300.0]);
    let bounds = cap_column(&mut rows, Feature::Lb).unwrap();
    assert_eq!(bounds.q1, 100.0);
    assert_eq!(bounds.q3, 110.0);
    assert_eq!(bounds.lower, 85.0);
    assert_eq!(bounds.upper, 125.0);
    assert_eq!(bounds.capped, 1);

    let lb: Vec<f64> = rows.iter().map(|r| r.get(Feature::Lb)).collect();
    assert_eq!(lb, vec![90.0, 100.0, 105.0, 110.0, 125.0]);
}

#[test]
fn quartiles_use_floor_index_without_interpolation() {
    let sorted = [90.0, 100.0, 110.0, 300.0];
    assert_eq!(quantile_at_index(&sorted, 0.25), Some(100.0));
    assert_eq!(quantile_at_index(&sorted, 0.75), Some(300.0));
    assert_eq!(quantile_at_index(&[], 0.5), None);
}

#[test]
fn lower_fence_never_negative() {
    let mut values = vec![0.0, 0.0, 1.0, 10.0];
    let bounds = IqrBounds::from_values(&mut values).unwrap();
    assert!(bounds.lower >= 0.0);
}

#[test]
fn capped_values_stay_within_bounds() {
    let mut rows = with(
        Feature::Astv,
        &[12.0, 17.0, 23.0, 29.0, 44.0, 51.0, 60.0, 87.0, 2.0, 99.0, 16.0],
    );
    let mut stats = CleaningStats::default();
    let bounds = cap_outliers(&mut rows, &mut stats);
    let astv = bounds.iter().find(|b| b.column == "ASTV").unwrap();
    let limits = IqrBounds {
        q1: astv.q1,
        q3: astv.q3,
        lower: astv.lower,
        upper: astv.upper,
    };
    for row in &rows {
        assert!(limits.contains(row.get(Feature::Astv)));
    }
    let total: u64 = bounds.iter().map(|b| b.capped).sum();
    assert_eq!(stats.outliers_capped, total);
}

#[test]
fn non_critical_columns_are_untouched() {
    let mut rows = with(Feature::Variance, &[1.0, 2.0, 3.0, 4.0, 5000.0]);
    for (i, row) in rows.iter_mut().enumerate() {
        row.set(Feature::Lb, 120.0 + i as f64);
    }
    let before: Vec<f64> = rows.iter().map(|r| r.get(Feature::Variance)).collect();
    let mut stats = CleaningStats::default();
    let bounds = cap_outliers(&mut rows, &mut stats);
    let after: Vec<f64> = rows.iter().map(|r| r.get(Feature::Variance)).collect();
    assert_eq!(before, after);
    assert!(bounds.iter().all(|b| b.column != "VARIANCE"));
    assert_eq!(stats.outliers_capped, 0);
}
