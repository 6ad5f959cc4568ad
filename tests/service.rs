use std::path::{Path, PathBuf};
use std::sync::Arc;

use kira_ctgqc::error::UploadError;
use kira_ctgqc::inference::FALLBACK_MODEL_VERSION;
use kira_ctgqc::schema::v1::PredictionSource;
use kira_ctgqc::service::{UploadOptions, UploadService};
use kira_ctgqc::store::PatientStore;
use tempfile::TempDir;

const HEADER: &str = "LB,AC,FM,UC,ASTV,MSTV,DS,DP,NSP,FileName";

fn write_csv(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut text = String::new();
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    std::fs::write(&path, text).unwrap();
    path
}

fn service(store: Arc<PatientStore>) -> UploadService {
    UploadService::without_model(store, UploadOptions::default())
}

#[test]
fn three_row_scenario_keeps_one_patient() {
    let dir = TempDir::new().unwrap();
    let input = write_csv(
        dir.path(),
        "ctg.csv",
        &[
            HEADER,
            "120,0,,0,73,0.5,0,0,2,a.txt",
            "132,0.006,0,0.006,17,2.1,0,0,1,b.txt",
            "132,0.006,0,0.006,17,2.1,0,0,1,c.txt",
        ],
    );
    let store = Arc::new(PatientStore::new());
    let summary = service(store.clone()).upload(&input).unwrap();

    assert!(summary.success);
    assert_eq!(summary.patients_count, 1);
    assert_eq!(summary.message, "Successfully analyzed 1 patients");
    let stats = &summary.data_cleaning;
    assert_eq!(stats.original_rows, 3);
    assert_eq!(stats.rows_removed, 1);
    assert_eq!(stats.duplicates_removed, 1);
    assert_eq!(stats.final_rows, 1);
    assert_eq!(stats.class_distribution.total(), summary.patients_count);
    assert_eq!(summary.summary, stats.class_distribution);
    assert_eq!(summary.prediction_source, PredictionSource::Fallback);

    let patients = store.patients();
    assert_eq!(patients.len(), 1);
    assert_eq!(patients[0].id, "P-10001");
    assert_eq!(patients[0].name, "b.txt");
    assert_eq!(patients[0].model_version, FALLBACK_MODEL_VERSION);
    assert_eq!(store.status().data_cleaning.as_ref(), Some(stats));
}

#[test]
fn header_only_file_is_no_data() {
    let dir = TempDir::new().unwrap();
    let input = write_csv(dir.path(), "empty.csv", &[HEADER]);
    let err = service(Arc::new(PatientStore::new()))
        .upload(&input)
        .unwrap_err();
    assert!(matches!(err, UploadError::NoData));
    assert!(err.stats().is_none());
}

#[test]
fn rejected_upload_keeps_previous_data() {
    let dir = TempDir::new().unwrap();
    let good = write_csv(
        dir.path(),
        "good.csv",
        &[
            HEADER,
            "120,0,0,0,20,1.2,0,0,1,a.txt",
            "150,0.003,0.1,0.004,65,0.4,3,2,3,b.txt",
        ],
    );
    let bad = write_csv(
        dir.path(),
        "bad.csv",
        &[HEADER, "120,,,0,20,1.2,0,0,1,x.txt", ",0,0,0,20,1.2,0,0,1,y.txt"],
    );
    let store = Arc::new(PatientStore::new());
    let svc = service(store.clone());
    svc.upload(&good).unwrap();
    let before = store.status();

    let err = svc.upload(&bad).unwrap_err();
    match &err {
        UploadError::NoValidRows { stats } => {
            assert_eq!(stats.original_rows, 2);
            assert_eq!(stats.rows_removed, 2);
        }
        other => panic!("expected NoValidRows, got {other}"),
    }
    assert_eq!(store.status(), before);
    assert_eq!(store.patients().len(), 2);
}

#[test]
fn unsupported_extension_is_rejected() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("ctg.json");
    std::fs::write(&input, "[]").unwrap();
    let err = service(Arc::new(PatientStore::new()))
        .upload(&input)
        .unwrap_err();
    assert!(matches!(err, UploadError::InputFormat(_)));
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = TempDir::new().unwrap();
    let err = service(Arc::new(PatientStore::new()))
        .upload(&dir.path().join("missing.csv"))
        .unwrap_err();
    assert!(matches!(err, UploadError::Read { .. }));
}

#[test]
fn inspect_does_not_touch_the_store() {
    let dir = TempDir::new().unwrap();
    let input = write_csv(
        dir.path(),
        "ctg.tsv",
        &["LB\tAC\tFM", "120\t0\t0", "300\t0\t0", "125\t0.001\t0"],
    );
    let store = Arc::new(PatientStore::new());
    let stats = service(store.clone()).inspect(&input).unwrap();
    assert_eq!(stats.final_rows, 3);
    assert_eq!(stats.original_rows, 3);
    assert!(!store.status().has_data);
}

#[test]
fn disguised_header_is_repaired() {
    let dir = TempDir::new().unwrap();
    let input = write_csv(
        dir.path(),
        "ctg.csv",
        &[",,", "LB,AC,FM", "120,0,0", "140,0.002,0"],
    );
    let summary = service(Arc::new(PatientStore::new()))
        .upload(&input)
        .unwrap();
    assert_eq!(summary.patients_count, 2);
}

#[test]
fn json_and_tsv_artifacts_are_written() {
    let dir = TempDir::new().unwrap();
    let input = write_csv(
        dir.path(),
        "ctg.csv",
        &[HEADER, "120,0,0,0,20,1.2,0,0,1,a.txt", "170,0,0,0,60,1.2,0,0,2,b.txt"],
    );
    let out = dir.path().join("out");
    let options = UploadOptions {
        out_dir: Some(out.clone()),
        write_json: true,
        write_tsv: true,
        threads: 1,
    };
    let svc = UploadService::without_model(Arc::new(PatientStore::new()), options);
    svc.upload(&input).unwrap();

    let upload: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("upload.json")).unwrap()).unwrap();
    assert_eq!(upload["tool"], "kira-ctgqc");
    assert_eq!(upload["schema_version"], "v1");
    assert_eq!(upload["upload"]["patientsCount"], 2);
    assert_eq!(upload["upload"]["predictionSource"], "fallback");

    let patients: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("patients.json")).unwrap()).unwrap();
    assert_eq!(patients[1]["riskLevel"], "suspect");
    assert_eq!(patients[1]["ctgFeatures"]["NSP"], 2);

    let tsv = std::fs::read_to_string(out.join("features.tsv")).unwrap();
    let lines: Vec<&str> = tsv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("patient_id\tLB\tAC"));
    assert!(lines[1].starts_with("P-10001\t"));
    assert!(out.join("reports.json").exists());
}
