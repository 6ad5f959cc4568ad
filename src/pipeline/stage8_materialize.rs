use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::schema::v1::UploadSummary;
use crate::store::materialize::materialize;

pub struct Stage8Materialize;

impl Stage8Materialize {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage8Materialize {
    fn name(&self) -> &'static str {
        "stage8_materialize"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let outcome = ctx.inference.as_ref().context("predictions missing")?;
        let built = materialize(&ctx.features, &outcome.results, ctx.run_date)?;
        ctx.stats.class_distribution = built.distribution;

        let count = built.patients.len() as u64;
        ctx.summary = Some(UploadSummary {
            success: true,
            message: format!("Successfully analyzed {} patients", count),
            patients_count: count,
            reports_count: built.reports.len() as u64,
            summary: built.distribution,
            data_cleaning: ctx.stats.clone(),
            prediction_source: outcome.source,
            fallback_reason: outcome.failure.clone(),
        });
        ctx.patients = built.patients;
        ctx.reports = built.reports;
        info!(patients = count, "patients_materialized");
        Ok(())
    }
}
