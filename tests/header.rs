use kira_ctgqc::cleaning::header::{looks_like_header, normalize_headers};
use kira_ctgqc::records::{CellValue, RawRecord};

fn record(pairs: &[(&str, CellValue)]) -> RawRecord {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn text(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}

#[test]
fn disguised_header_row_is_promoted() {
    let records = vec![
        record(&[
            ("__EMPTY", text("lb")),
            ("__EMPTY_1", text("AC")),
            ("Table 1", text("fm")),
        ]),
        record(&[
            ("__EMPTY", CellValue::Number(120.0)),
            ("__EMPTY_1", CellValue::Number(0.0)),
            ("Table 1", CellValue::Number(0.0)),
        ]),
    ];
    let repair = normalize_headers(records);
    assert!(repair.repaired);
    assert_eq!(repair.records.len(), 1);
    let keys: Vec<&str> = repair.records[0].keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["LB", "AC", "FM"]);
    assert_eq!(repair.records[0]["LB"], CellValue::Number(120.0));
}

#[test]
fn regular_rows_only_get_uppercased() {
    let records = vec![record(&[
        ("lb", CellValue::Number(132.0)),
        ("Width", CellValue::Number(64.0)),
    ])];
    let repair = normalize_headers(records);
    assert!(!repair.repaired);
    assert_eq!(repair.records.len(), 1);
    assert!(repair.records[0].contains_key("LB"));
    assert!(repair.records[0].contains_key("WIDTH"));
}

#[test]
fn unmapped_keys_keep_their_name() {
    let records = vec![
        record(&[("A", text("NSP")), ("extra", CellValue::Number(1.0))]),
        record(&[("A", CellValue::Number(2.0)), ("extra", CellValue::Number(5.0))]),
    ];
    let repair = normalize_headers(records);
    assert!(repair.repaired);
    let row = &repair.records[0];
    assert_eq!(row["NSP"], CellValue::Number(2.0));
    assert_eq!(row["EXTRA"], CellValue::Number(5.0));
}

#[test]
fn numbers_never_look_like_headers() {
    let row = record(&[("LB", CellValue::Number(120.0))]);
    assert!(!looks_like_header(&row));
    assert!(normalize_headers(Vec::new()).records.is_empty());
}
