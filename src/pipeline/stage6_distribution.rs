use anyhow::Result;
use tracing::info;

use crate::cleaning::distribution::label_distribution;
use crate::ctx::Ctx;
use crate::error::UploadError;
use crate::pipeline::Stage;

pub struct Stage6Distribution;

impl Stage6Distribution {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage6Distribution {
    fn name(&self) -> &'static str {
        "stage6_distribution"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        ctx.stats.final_rows = ctx.features.len() as u64;
        if ctx.features.is_empty() {
            return Err(UploadError::EmptyAfterCleaning {
                stats: ctx.stats.clone(),
            }
            .into());
        }
        let dist = label_distribution(&ctx.features);
        ctx.label_distribution = dist;
        // Superseded by the final tally once predictions exist.
        ctx.stats.class_distribution = dist;
        info!(
            normal = dist.normal,
            suspect = dist.suspect,
            high = dist.high,
            unknown = dist.unknown,
            "source_labels_counted"
        );
        Ok(())
    }
}
