use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::io::{json_writer, tsv_writer};
use crate::pipeline::Stage;

pub struct Stage9Output;

impl Stage9Output {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage9Output {
    fn name(&self) -> &'static str {
        "stage9_output"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let Some(output) = ctx.output.clone() else {
            return Ok(());
        };
        if !ctx.write_json && !ctx.write_tsv {
            return Ok(());
        }
        std::fs::create_dir_all(&output.out_dir)
            .with_context(|| format!("failed to create {}", output.out_dir.display()))?;

        if ctx.write_json {
            json_writer::write_upload_json(&output.upload_json, ctx)?;
            json_writer::write_patients_json(&output.patients_json, ctx)?;
            json_writer::write_reports_json(&output.reports_json, ctx)?;
        }
        if ctx.write_tsv {
            tsv_writer::write_tsv(&output.features_tsv, ctx)?;
        }

        info!(out_dir = %output.out_dir.display(), "outputs_written");
        Ok(())
    }
}
