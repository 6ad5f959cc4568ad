use anyhow::Result;
use tracing::info;

use crate::cleaning::dedup::dedup_rows;
use crate::ctx::Ctx;
use crate::pipeline::Stage;

pub struct Stage3Dedup;

impl Stage3Dedup {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage3Dedup {
    fn name(&self) -> &'static str {
        "stage3_dedup"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        ctx.records = dedup_rows(std::mem::take(&mut ctx.records), &mut ctx.stats);
        info!(
            rows = ctx.records.len(),
            duplicates = ctx.stats.duplicates_removed,
            "duplicates_removed"
        );
        Ok(())
    }
}
