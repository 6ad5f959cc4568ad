use anyhow::Result;
use tracing::info;

use crate::cleaning::outliers::cap_outliers;
use crate::ctx::Ctx;
use crate::pipeline::Stage;

pub struct Stage5Outliers;

impl Stage5Outliers {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage5Outliers {
    fn name(&self) -> &'static str {
        "stage5_outliers"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        ctx.outlier_bounds = cap_outliers(&mut ctx.features, &mut ctx.stats);
        info!(
            columns = ctx.outlier_bounds.len(),
            capped = ctx.stats.outliers_capped,
            "outliers_capped"
        );
        Ok(())
    }
}
