use anyhow::{Result, bail};
use chrono::NaiveDate;

use crate::cleaning::distribution::risk_distribution;
use crate::inference::InferenceResult;
use crate::records::FeatureVector;
use crate::schema::v1::{ClassDistribution, Patient, Report, ReportStatus, RiskLevel};

const CLINICIANS: [&str; 5] = ["Dr. Lim", "Dr. Koh", "Dr. Patel", "Dr. Chen", "Dr. Singh"];

#[derive(Debug, Clone)]
pub struct Materialized {
    pub patients: Vec<Patient>,
    pub reports: Vec<Report>,
    pub distribution: ClassDistribution,
}

/// `P-10001` for row 0.
pub fn patient_id(index: usize) -> String {
    format!("P-{:05}", 10000 + index + 1)
}

/// `R-0001` for row 0.
pub fn report_id(index: usize) -> String {
    format!("R-{:04}", index + 1)
}

pub fn materialize(
    features: &[FeatureVector],
    predictions: &[InferenceResult],
    date: NaiveDate,
) -> Result<Materialized> {
    if features.len() != predictions.len() {
        bail!(
            "prediction count ({}) does not match row count ({})",
            predictions.len(),
            features.len()
        );
    }

    let mut patients = Vec::with_capacity(features.len());
    let mut reports = Vec::with_capacity(features.len());
    for (index, (row, pred)) in features.iter().zip(predictions).enumerate() {
        let patient = build_patient(index, row, pred, date);
        reports.push(Report {
            id: report_id(index),
            patient_id: patient.id.clone(),
            patient_name: patient.name.clone(),
            date,
            risk_level: patient.risk_level,
            clinician: patient.attending_doctor.clone(),
            model_version: patient.model_version.clone(),
            status: ReportStatus::Completed,
            features: patient.ctg_features.clone(),
        });
        patients.push(patient);
    }

    let distribution = risk_distribution(&patients);
    Ok(Materialized {
        patients,
        reports,
        distribution,
    })
}

fn build_patient(
    index: usize,
    row: &FeatureVector,
    pred: &InferenceResult,
    date: NaiveDate,
) -> Patient {
    let risk_level = RiskLevel::from(pred.classification);
    let name = row
        .file_name
        .clone()
        .unwrap_or_else(|| format!("Patient {}", index + 1));
    // Filler demographics only need to be stable per row.
    let n = index as u32;
    Patient {
        id: patient_id(index),
        name,
        age: 25 + (n * 7) % 15,
        gestational_age: 36 + (n * 3) % 5,
        room: (n * 11) % 20 + 1,
        status: risk_level.status(),
        risk_level,
        risk_score: (pred.risk_score * 100.0).round() / 100.0,
        classification: pred.classification,
        probabilities: pred.probabilities,
        model_version: pred.model_version.clone(),
        admission_date: date,
        attending_doctor: CLINICIANS[index % CLINICIANS.len()].to_string(),
        ctg_features: row.with_label(pred.classification.nsp()),
    }
}
