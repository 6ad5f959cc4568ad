//! One upload at a time against a shared [`PatientStore`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::ctx::Ctx;
use crate::error::UploadError;
use crate::inference::{BatchScorer, InferenceOrchestrator, RuleBasedScorer};
use crate::pipeline::stage0_read::Stage0Read;
use crate::pipeline::stage1_header::Stage1Header;
use crate::pipeline::stage2_validate::Stage2Validate;
use crate::pipeline::stage3_dedup::Stage3Dedup;
use crate::pipeline::stage4_impute::Stage4Impute;
use crate::pipeline::stage5_outliers::Stage5Outliers;
use crate::pipeline::stage6_distribution::Stage6Distribution;
use crate::pipeline::stage7_inference::Stage7Inference;
use crate::pipeline::stage8_materialize::Stage8Materialize;
use crate::pipeline::stage9_output::Stage9Output;
use crate::pipeline::{Pipeline, Stage};
use crate::schema::v1::{CleaningStats, StoreStatus, UploadSummary};
use crate::store::{Dataset, PatientStore};

#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    pub out_dir: Option<PathBuf>,
    pub write_json: bool,
    pub write_tsv: bool,
    /// Fallback scorer threads; 0 = auto.
    pub threads: usize,
}

pub struct UploadService {
    store: Arc<PatientStore>,
    scorer: Option<Arc<dyn BatchScorer>>,
    options: UploadOptions,
}

impl UploadService {
    pub fn new(
        store: Arc<PatientStore>,
        scorer: Arc<dyn BatchScorer>,
        options: UploadOptions,
    ) -> Self {
        Self {
            store,
            scorer: Some(scorer),
            options,
        }
    }

    /// Every upload is scored by the rule-based fallback.
    pub fn without_model(store: Arc<PatientStore>, options: UploadOptions) -> Self {
        Self {
            store,
            scorer: None,
            options,
        }
    }

    pub fn store(&self) -> &Arc<PatientStore> {
        &self.store
    }

    /// Runs the full pipeline and, only if it succeeds, swaps the new patients
    /// and reports into the store. Any error leaves the store untouched.
    pub fn upload(&self, input: &Path) -> Result<UploadSummary, UploadError> {
        let writer = self.store.lock_writer();
        let mut ctx = self.new_ctx(input);

        let mut stages = cleaning_stages();
        stages.push(Box::new(Stage7Inference::new(self.orchestrator())));
        stages.push(Box::new(Stage8Materialize::new()));
        stages.push(Box::new(Stage9Output::new()));
        Pipeline::new(stages)
            .run(&mut ctx)
            .map_err(UploadError::from_pipeline)?;

        let summary = ctx.summary.take().context("upload summary missing")?;
        writer.replace(Dataset {
            patients: std::mem::take(&mut ctx.patients),
            reports: std::mem::take(&mut ctx.reports),
            data_cleaning: Some(summary.data_cleaning.clone()),
        });
        info!(
            patients = summary.patients_count,
            source = ?summary.prediction_source,
            "store_replaced"
        );
        Ok(summary)
    }

    /// Reading and cleaning only; nothing is scored or stored.
    pub fn inspect(&self, input: &Path) -> Result<CleaningStats, UploadError> {
        let mut ctx = self.new_ctx(input);
        Pipeline::new(cleaning_stages())
            .run(&mut ctx)
            .map_err(UploadError::from_pipeline)?;
        Ok(ctx.stats)
    }

    pub fn clear(&self) -> StoreStatus {
        let status = self.store.clear();
        info!("store_cleared");
        status
    }

    fn new_ctx(&self, input: &Path) -> Ctx {
        let mut ctx = Ctx::new(
            input.to_path_buf(),
            self.options.out_dir.clone(),
            env!("CARGO_PKG_VERSION"),
        );
        ctx.write_json = self.options.write_json;
        ctx.write_tsv = self.options.write_tsv;
        ctx.threads = self.options.threads;
        ctx
    }

    fn orchestrator(&self) -> InferenceOrchestrator {
        let fallback = RuleBasedScorer::new().with_threads(self.options.threads);
        match &self.scorer {
            Some(scorer) => InferenceOrchestrator::new(Arc::clone(scorer), fallback),
            None => InferenceOrchestrator::fallback_only(fallback),
        }
    }
}

fn cleaning_stages() -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(Stage0Read::new()),
        Box::new(Stage1Header::new()),
        Box::new(Stage2Validate::new()),
        Box::new(Stage3Dedup::new()),
        Box::new(Stage4Impute::new()),
        Box::new(Stage5Outliers::new()),
        Box::new(Stage6Distribution::new()),
    ]
}
