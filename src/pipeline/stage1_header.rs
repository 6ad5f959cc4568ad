use anyhow::Result;
use tracing::info;

use crate::cleaning::header::normalize_headers;
use crate::ctx::Ctx;
use crate::pipeline::Stage;

pub struct Stage1Header;

impl Stage1Header {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage1Header {
    fn name(&self) -> &'static str {
        "stage1_header"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let repair = normalize_headers(std::mem::take(&mut ctx.records));
        if repair.repaired {
            info!("header_row_repaired");
            ctx.warnings
                .push("first row held column names; promoted to header".to_string());
        }
        ctx.header_repaired = repair.repaired;
        ctx.records = repair.records;
        ctx.stats.original_rows = ctx.records.len() as u64;
        Ok(())
    }
}
