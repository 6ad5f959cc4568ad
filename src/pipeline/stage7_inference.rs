use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::inference::InferenceOrchestrator;
use crate::pipeline::Stage;
use crate::schema::v1::PredictionSource;

pub struct Stage7Inference {
    orchestrator: InferenceOrchestrator,
}

impl Stage7Inference {
    pub fn new(orchestrator: InferenceOrchestrator) -> Self {
        Self { orchestrator }
    }
}

impl Stage for Stage7Inference {
    fn name(&self) -> &'static str {
        "stage7_inference"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let outcome = self.orchestrator.run(&ctx.features);
        if outcome.source == PredictionSource::Fallback {
            if let Some(reason) = &outcome.failure {
                ctx.warnings
                    .push(format!("model scoring failed, rule-based fallback used: {}", reason));
            }
        }
        info!(
            rows = outcome.results.len(),
            source = ?outcome.source,
            threads = ctx.threads,
            "predictions_ready"
        );
        ctx.inference = Some(outcome);
        Ok(())
    }
}
