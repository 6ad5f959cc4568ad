use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::inference::InferenceOutcome;
use crate::records::{FeatureVector, RawRecord};
use crate::schema::v1::{
    ClassDistribution, CleaningStats, ColumnBounds, Patient, Report, UploadSummary,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Workbook,
    Delimited { delimiter: u8 },
}

impl InputFormat {
    /// Detects the reader from the file name; `.gz` is allowed on delimited
    /// text only.
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        let (inner, gzip) = match name.strip_suffix(".gz") {
            Some(inner) => (inner, true),
            None => (name.as_str(), false),
        };
        let ext = Path::new(inner).extension()?.to_str()?;
        match (ext, gzip) {
            ("xlsx" | "xlsm" | "xlsb" | "xls" | "ods", false) => Some(Self::Workbook),
            ("csv", _) => Some(Self::Delimited { delimiter: b',' }),
            ("tsv", _) => Some(Self::Delimited { delimiter: b'\t' }),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workbook => "workbook",
            Self::Delimited { delimiter: b'\t' } => "tsv",
            Self::Delimited { .. } => "csv",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub out_dir: PathBuf,
    pub upload_json: PathBuf,
    pub patients_json: PathBuf,
    pub reports_json: PathBuf,
    pub features_tsv: PathBuf,
}

impl OutputPaths {
    pub fn new(out_dir: PathBuf) -> Self {
        Self {
            upload_json: out_dir.join("upload.json"),
            patients_json: out_dir.join("patients.json"),
            reports_json: out_dir.join("reports.json"),
            features_tsv: out_dir.join("features.tsv"),
            out_dir,
        }
    }
}

#[derive(Debug)]
pub struct Ctx {
    pub input: PathBuf,
    pub input_format: Option<InputFormat>,
    pub sheet_name: Option<String>,
    pub output: Option<OutputPaths>,
    pub write_json: bool,
    pub write_tsv: bool,
    pub threads: usize,
    pub tool_version: String,
    pub run_date: NaiveDate,
    pub header_repaired: bool,
    pub records: Vec<RawRecord>,
    pub features: Vec<FeatureVector>,
    pub stats: CleaningStats,
    pub label_distribution: ClassDistribution,
    pub outlier_bounds: Vec<ColumnBounds>,
    pub inference: Option<InferenceOutcome>,
    pub patients: Vec<Patient>,
    pub reports: Vec<Report>,
    pub summary: Option<UploadSummary>,
    pub warnings: Vec<String>,
}

impl Ctx {
    pub fn new(input: PathBuf, out_dir: Option<PathBuf>, tool_version: &str) -> Self {
        Self {
            input_format: InputFormat::detect(&input),
            input,
            sheet_name: None,
            output: out_dir.map(OutputPaths::new),
            write_json: false,
            write_tsv: false,
            threads: 0,
            tool_version: tool_version.to_string(),
            run_date: chrono::Local::now().date_naive(),
            header_repaired: false,
            records: Vec::new(),
            features: Vec::new(),
            stats: CleaningStats::default(),
            label_distribution: ClassDistribution::default(),
            outlier_bounds: Vec::new(),
            inference: None,
            patients: Vec::new(),
            reports: Vec::new(),
            summary: None,
            warnings: Vec::new(),
        }
    }
}
