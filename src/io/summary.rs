use crate::schema::v1::{CleaningStats, PredictionSource, UploadSummary};

pub fn format_cleaning(stats: &CleaningStats) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Rows: original={}, removed={}, duplicates={}, final={}\n",
        stats.original_rows, stats.rows_removed, stats.duplicates_removed, stats.final_rows
    ));
    out.push_str(&format!(
        "Imputed: {} values in {} rows\n",
        stats.values_imputed, stats.rows_with_missing_values
    ));
    out.push_str(&format!("Outliers capped: {}\n", stats.outliers_capped));
    let d = &stats.class_distribution;
    out.push_str(&format!(
        "Classes: normal={}, suspect={}, high={}, unknown={}\n",
        d.normal, d.suspect, d.high, d.unknown
    ));
    out
}

pub fn format_summary(summary: &UploadSummary) -> String {
    let version = env!("CARGO_PKG_VERSION");
    let mut out = String::new();
    out.push_str(&format!("kira-ctgqc v{}\n", version));
    out.push_str(&format!("{}\n", summary.message));
    out.push_str(&format!(
        "Patients: {}, reports: {}\n",
        summary.patients_count, summary.reports_count
    ));
    match summary.prediction_source {
        PredictionSource::Model => out.push_str("Predictions: model\n"),
        PredictionSource::Fallback => {
            let reason = summary.fallback_reason.as_deref().unwrap_or("model disabled");
            out.push_str(&format!("Predictions: fallback ({})\n", reason));
        }
    }
    out.push_str(&format_cleaning(&summary.data_cleaning));
    out
}
