use anyhow::Result;
use tracing::info;

use crate::cleaning::impute::impute;
use crate::ctx::Ctx;
use crate::pipeline::Stage;

pub struct Stage4Impute;

impl Stage4Impute {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage4Impute {
    fn name(&self) -> &'static str {
        "stage4_impute"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        ctx.features = impute(&ctx.records, &mut ctx.stats);
        // Raw records are not needed past this point.
        ctx.records.clear();
        info!(
            values_imputed = ctx.stats.values_imputed,
            rows_with_missing = ctx.stats.rows_with_missing_values,
            "missing_values_imputed"
        );
        Ok(())
    }
}
