use anyhow::Result;
use tracing::info;

use crate::cleaning::validate::{Validation, validate_rows};
use crate::ctx::Ctx;
use crate::error::UploadError;
use crate::pipeline::Stage;

pub struct Stage2Validate;

impl Stage2Validate {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage2Validate {
    fn name(&self) -> &'static str {
        "stage2_validate"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let rows = match validate_rows(std::mem::take(&mut ctx.records), &mut ctx.stats) {
            Validation::NoData => return Err(UploadError::NoData.into()),
            Validation::Rows(rows) => rows,
        };
        if rows.is_empty() {
            return Err(UploadError::NoValidRows {
                stats: ctx.stats.clone(),
            }
            .into());
        }
        info!(
            valid = rows.len(),
            removed = ctx.stats.rows_removed,
            "rows_validated"
        );
        ctx.records = rows;
        Ok(())
    }
}
