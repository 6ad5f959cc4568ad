use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::records::FeatureVector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Normal,
    Suspect,
    Pathologic,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Normal => "Normal",
            Classification::Suspect => "Suspect",
            Classification::Pathologic => "Pathologic",
        }
    }

    /// NSP code written back into the feature snapshot.
    pub fn nsp(&self) -> u8 {
        match self {
            Classification::Normal => 1,
            Classification::Suspect => 2,
            Classification::Pathologic => 3,
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probabilities {
    #[serde(rename = "Normal")]
    pub normal: f64,
    #[serde(rename = "Suspect")]
    pub suspect: f64,
    #[serde(rename = "Pathologic")]
    pub pathologic: f64,
}

impl Probabilities {
    pub fn sum(&self) -> f64 {
        self.normal + self.suspect + self.pathologic
    }

    pub fn get(&self, class: Classification) -> f64 {
        match class {
            Classification::Normal => self.normal,
            Classification::Suspect => self.suspect,
            Classification::Pathologic => self.pathologic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Normal,
    Suspect,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Normal => "normal",
            RiskLevel::Suspect => "suspect",
            RiskLevel::High => "high",
        }
    }

    pub fn status(&self) -> PatientStatus {
        match self {
            RiskLevel::High => PatientStatus::Critical,
            RiskLevel::Suspect => PatientStatus::Active,
            RiskLevel::Normal => PatientStatus::Stable,
        }
    }
}

impl From<Classification> for RiskLevel {
    fn from(class: Classification) -> Self {
        match class {
            Classification::Normal => RiskLevel::Normal,
            Classification::Suspect => RiskLevel::Suspect,
            Classification::Pathologic => RiskLevel::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientStatus {
    Critical,
    Active,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Completed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDistribution {
    pub normal: u64,
    pub suspect: u64,
    pub high: u64,
    pub unknown: u64,
}

impl ClassDistribution {
    /// Tally by source NSP code; anything outside 1..=3 is unknown.
    pub fn record_label(&mut self, nsp: u8) {
        match nsp {
            1 => self.normal += 1,
            2 => self.suspect += 1,
            3 => self.high += 1,
            _ => self.unknown += 1,
        }
    }

    pub fn record_level(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Normal => self.normal += 1,
            RiskLevel::Suspect => self.suspect += 1,
            RiskLevel::High => self.high += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.normal + self.suspect + self.high + self.unknown
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningStats {
    pub original_rows: u64,
    pub duplicates_removed: u64,
    pub rows_with_missing_values: u64,
    pub rows_removed: u64,
    pub values_imputed: u64,
    pub outliers_capped: u64,
    pub final_rows: u64,
    pub class_distribution: ClassDistribution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionSource {
    Model,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnBounds {
    pub column: String,
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
    pub capped: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub gestational_age: u32,
    pub room: u32,
    pub status: PatientStatus,
    pub risk_level: RiskLevel,
    pub risk_score: f64,
    pub classification: Classification,
    pub probabilities: Probabilities,
    pub model_version: String,
    pub admission_date: NaiveDate,
    pub attending_doctor: String,
    pub ctg_features: FeatureVector,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub date: NaiveDate,
    pub risk_level: RiskLevel,
    pub clinician: String,
    pub model_version: String,
    pub status: ReportStatus,
    pub features: FeatureVector,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSummary {
    pub success: bool,
    pub message: String,
    pub patients_count: u64,
    pub reports_count: u64,
    pub summary: ClassDistribution,
    pub data_cleaning: CleaningStats,
    pub prediction_source: PredictionSource,
    pub fallback_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStatus {
    pub has_data: bool,
    pub patients_count: u64,
    pub reports_count: u64,
    pub data_cleaning: Option<CleaningStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputMeta {
    pub path: String,
    pub format: String,
    pub sheet: Option<String>,
    pub header_repaired: bool,
}

/// Upload artifact written next to the patient/report dumps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CtgQcV1 {
    pub tool: String,
    pub version: String,
    pub schema_version: String,
    pub input: InputMeta,
    pub upload: UploadSummary,
    pub source_label_distribution: ClassDistribution,
    pub outlier_bounds: Vec<ColumnBounds>,
    pub warnings: Vec<String>,
}
