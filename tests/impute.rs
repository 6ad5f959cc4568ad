use kira_ctgqc::cleaning::impute::{column_means, impute, parse_label};
use kira_ctgqc::records::{CellValue, Feature, RawRecord};
use kira_ctgqc::schema::v1::CleaningStats;

fn row(pairs: &[(&str, CellValue)]) -> RawRecord {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn num(v: f64) -> CellValue {
    CellValue::Number(v)
}

#[test]
fn missing_and_negative_values_take_column_mean() {
    let records = vec![
        row(&[("LB", num(120.0)), ("AC", num(0.0)), ("FM", num(-1.0))]),
        row(&[("LB", num(140.0)), ("AC", num(0.004)), ("FM", num(0.5))]),
    ];
    let mut stats = CleaningStats::default();
    let features = impute(&records, &mut stats);

    assert_eq!(features.len(), 2);
    // FM mean ignores the negative reading.
    assert_eq!(features[0].get(Feature::Fm), 0.5);
    assert_eq!(features[0].get(Feature::Lb), 120.0);
    // Absent columns have mean 0.
    assert_eq!(features[1].get(Feature::Width), 0.0);
    // 18 absent columns per row plus the negative FM.
    assert_eq!(stats.values_imputed, 18 * 2 + 1);
    assert_eq!(stats.rows_with_missing_values, 2);
}

#[test]
fn imputation_is_idempotent_on_clean_batch() {
    let records = vec![
        row(&[("LB", num(120.0)), ("AC", CellValue::Empty), ("FM", num(0.0)), ("NSP", num(2.0))]),
        row(&[("LB", num(150.0)), ("AC", num(0.01)), ("FM", num(0.2))]),
    ];
    let mut stats = CleaningStats::default();
    let first = impute(&records, &mut stats);
    assert!(stats.values_imputed > 0);

    let again: Vec<RawRecord> = first.iter().map(|f| f.to_record()).collect();
    let mut stats2 = CleaningStats::default();
    let second = impute(&again, &mut stats2);
    assert_eq!(stats2.values_imputed, 0);
    assert_eq!(stats2.rows_with_missing_values, 0);
    assert_eq!(first, second);
}

#[test]
fn label_falls_back_to_class_and_truncates() {
    assert_eq!(parse_label(&row(&[("NSP", num(2.7))])), 2);
    assert_eq!(parse_label(&row(&[("NSP", num(0.0)), ("CLASS", num(3.0))])), 3);
    assert_eq!(parse_label(&row(&[("CLASS", CellValue::Text("1".into()))])), 1);
    assert_eq!(parse_label(&row(&[("NSP", num(7.0))])), 0);
    assert_eq!(parse_label(&row(&[("NSP", CellValue::Text("x".into()))])), 0);
    assert_eq!(parse_label(&RawRecord::new()), 0);
}

#[test]
fn filename_is_carried_through() {
    let records = vec![row(&[
        ("LB", num(120.0)),
        ("FileName", CellValue::Text("CTG0001.txt".into())),
    ])];
    let mut stats = CleaningStats::default();
    let features = impute(&records, &mut stats);
    assert_eq!(features[0].file_name.as_deref(), Some("CTG0001.txt"));
}

#[test]
fn means_use_text_numbers() {
    let records = vec![
        row(&[("LB", CellValue::Text("100".into()))]),
        row(&[("LB", num(200.0))]),
    ];
    let means = column_means(&records);
    assert_eq!(means[Feature::Lb.index()], 150.0);
}
