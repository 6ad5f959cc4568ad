use std::path::Path;

use anyhow::{Context, Result};

use crate::ctx::Ctx;
use crate::io::write_json;
use crate::schema::v1::{CtgQcV1, InputMeta};

pub fn build_report(ctx: &Ctx) -> Result<CtgQcV1> {
    let upload = ctx.summary.clone().context("upload summary missing")?;
    Ok(CtgQcV1 {
        tool: "kira-ctgqc".to_string(),
        version: ctx.tool_version.clone(),
        schema_version: "v1".to_string(),
        input: InputMeta {
            path: ctx.input.display().to_string(),
            format: ctx
                .input_format
                .map(|f| f.as_str().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            sheet: ctx.sheet_name.clone(),
            header_repaired: ctx.header_repaired,
        },
        upload,
        source_label_distribution: ctx.label_distribution,
        outlier_bounds: ctx.outlier_bounds.clone(),
        warnings: ctx.warnings.clone(),
    })
}

pub fn write_upload_json(path: &Path, ctx: &Ctx) -> Result<()> {
    let report = build_report(ctx)?;
    write_json(path, &report)
}

pub fn write_patients_json(path: &Path, ctx: &Ctx) -> Result<()> {
    write_json(path, &ctx.patients)
}

pub fn write_reports_json(path: &Path, ctx: &Ctx) -> Result<()> {
    write_json(path, &ctx.reports)
}
