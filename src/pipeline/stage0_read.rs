use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::error::UploadError;
use crate::io::spreadsheet::read_records;
use crate::pipeline::Stage;

pub struct Stage0Read;

impl Stage0Read {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage0Read {
    fn name(&self) -> &'static str {
        "stage0_read"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let Some(format) = ctx.input_format else {
            return Err(UploadError::InputFormat(ctx.input.display().to_string()).into());
        };
        let sheet = read_records(&ctx.input, format).map_err(|err| UploadError::Read {
            path: ctx.input.display().to_string(),
            reason: format!("{:#}", err),
        })?;
        ctx.sheet_name = sheet.sheet;
        ctx.records = sheet.records;
        info!(
            format = format.as_str(),
            rows = ctx.records.len(),
            "input_read"
        );
        Ok(())
    }
}
