use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use flate2::Compression;
use flate2::write::GzEncoder;
use kira_ctgqc::cleaning::header::normalize_headers;
use kira_ctgqc::ctx::InputFormat;
use kira_ctgqc::io::spreadsheet::read_records;
use kira_ctgqc::records::CellValue;
use kira_ctgqc::service::{UploadOptions, UploadService};
use kira_ctgqc::store::PatientStore;
use tempfile::TempDir;

#[test]
fn format_detection_by_extension() {
    assert_eq!(
        InputFormat::detect(Path::new("a/CTG.XLSX")),
        Some(InputFormat::Workbook)
    );
    assert_eq!(
        InputFormat::detect(Path::new("ctg.xls")),
        Some(InputFormat::Workbook)
    );
    assert_eq!(
        InputFormat::detect(Path::new("ctg.tsv.gz")),
        Some(InputFormat::Delimited { delimiter: b'\t' })
    );
    assert_eq!(
        InputFormat::detect(Path::new("ctg.csv")),
        Some(InputFormat::Delimited { delimiter: b',' })
    );
    assert_eq!(InputFormat::detect(Path::new("ctg.xlsx.gz")), None);
    assert_eq!(InputFormat::detect(Path::new("ctg.txt")), None);
    assert_eq!(InputFormat::detect(Path::new("ctg")), None);
}

#[test]
fn gzipped_csv_is_read() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ctg.csv.gz");
    let file = std::fs::File::create(&path).unwrap();
    let mut enc = GzEncoder::new(file, Compression::default());
    enc.write_all(b"LB,AC,FM\n120,0,0\n,,\n133,0.003,\n").unwrap();
    enc.finish().unwrap();

    let format = InputFormat::detect(&path).unwrap();
    let sheet = read_records(&path, format).unwrap();
    assert!(sheet.sheet.is_none());
    // The blank row is skipped; empty cells are omitted.
    assert_eq!(sheet.records.len(), 2);
    assert_eq!(sheet.records[0]["LB"], CellValue::Text("120".into()));
    assert!(!sheet.records[1].contains_key("FM"));
}

#[test]
fn bom_is_stripped_from_first_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ctg.csv");
    std::fs::write(&path, "\u{feff}LB,AC,FM\n120,0,0\n").unwrap();
    let sheet = read_records(&path, InputFormat::Delimited { delimiter: b',' }).unwrap();
    assert!(sheet.records[0].contains_key("LB"));
}

#[test]
fn corrupt_workbook_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ctg.xlsx");
    std::fs::write(&path, b"not a zip archive").unwrap();
    assert!(read_records(&path, InputFormat::Workbook).is_err());
}

fn workbook_fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/ctg_two_sheets.xlsx")
}

#[test]
fn workbook_data_sheet_is_chosen_and_numbers_kept() {
    let path = workbook_fixture();
    let format = InputFormat::detect(&path).unwrap();
    assert_eq!(format, InputFormat::Workbook);

    let sheet = read_records(&path, format).unwrap();
    // "Raw Data" is the second sheet.
    assert_eq!(sheet.sheet.as_deref(), Some("Raw Data"));
    assert_eq!(sheet.records.len(), 3);
    assert_eq!(sheet.records[0]["CTG export"], CellValue::Text("LB".into()));
    assert_eq!(sheet.records[0]["__EMPTY"], CellValue::Text("ac".into()));

    let repair = normalize_headers(sheet.records);
    assert!(repair.repaired);
    assert_eq!(repair.records.len(), 2);
    let keys: Vec<&str> = repair.records[0].keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["LB", "AC", "FM", "NSP"]);
    assert_eq!(repair.records[0]["LB"], CellValue::Number(120.0));
    assert_eq!(repair.records[1]["AC"], CellValue::Number(0.003));
    assert_eq!(repair.records[1]["NSP"], CellValue::Number(2.0));
}

#[test]
fn workbook_upload_scores_repaired_rows() {
    let service =
        UploadService::without_model(Arc::new(PatientStore::new()), UploadOptions::default());
    let summary = service.upload(&workbook_fixture()).unwrap();
    assert_eq!(summary.patients_count, 2);
    assert_eq!(summary.data_cleaning.original_rows, 2);
    assert_eq!(summary.data_cleaning.rows_removed, 0);
    assert_eq!(service.store().patients()[0].ctg_features.values[0], 120.0);
}
