use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::warn;

use crate::error::ScorerError;
use crate::inference::{BatchScorer, InferenceResult};
use crate::records::{Feature, FeatureVector};
use crate::schema::v1::{Classification, Probabilities};

pub const FALLBACK_MODEL_VERSION: &str = "Review Needed (Simulation)";

const PRIOR_NORMAL: f64 = 0.70;
const PRIOR_SUSPECT: f64 = 0.20;
const PRIOR_PATHOLOGIC: f64 = 0.10;

const ASTV_THRESHOLD: f64 = 50.0;
const DS_THRESHOLD: f64 = 2.0;
const DP_THRESHOLD: f64 = 1.0;
const LB_LOW: f64 = 110.0;
const LB_HIGH: f64 = 160.0;

/// Deterministic threshold heuristic over ASTV, DS, DP and LB.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedScorer {
    threads: usize,
}

impl RuleBasedScorer {
    pub fn new() -> Self {
        Self { threads: 0 }
    }

    /// 0 lets rayon pick.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn score(&self, features: &FeatureVector) -> InferenceResult {
        score_at(features, Utc::now())
    }

    pub fn score_all(&self, batch: &[FeatureVector]) -> Vec<InferenceResult> {
        let now = Utc::now();
        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()
        {
            Ok(pool) => pool.install(|| batch.par_iter().map(|f| score_at(f, now)).collect()),
            Err(err) => {
                warn!(error = %err, "fallback thread pool unavailable; scoring serially");
                batch.iter().map(|f| score_at(f, now)).collect()
            }
        }
    }
}

impl BatchScorer for RuleBasedScorer {
    fn name(&self) -> &'static str {
        "rules"
    }

    fn score_batch(&self, batch: &[FeatureVector]) -> Result<Vec<InferenceResult>, ScorerError> {
        Ok(self.score_all(batch))
    }
}

/// Adjusted, clamped and renormalized class probabilities (unrounded).
pub fn rule_probabilities(features: &FeatureVector) -> Probabilities {
    let mut normal = PRIOR_NORMAL;
    let mut suspect = PRIOR_SUSPECT;
    let mut pathologic = PRIOR_PATHOLOGIC;

    if features.get(Feature::Astv) > ASTV_THRESHOLD {
        normal -= 0.30;
        pathologic += 0.20;
        suspect += 0.10;
    }
    if features.get(Feature::Ds) > DS_THRESHOLD {
        normal -= 0.30;
        pathologic += 0.30;
    }
    if features.get(Feature::Dp) > DP_THRESHOLD {
        normal -= 0.20;
        pathologic += 0.20;
    }
    let lb = features.get(Feature::Lb);
    if lb > LB_HIGH || lb < LB_LOW {
        normal -= 0.15;
        suspect += 0.10;
        pathologic += 0.05;
    }

    let normal = normal.max(0.0);
    let suspect = suspect.max(0.0);
    let pathologic = pathologic.max(0.0);
    // Suspect only ever grows from its prior, so the total stays positive.
    let total = normal + suspect + pathologic;
    Probabilities {
        normal: normal / total,
        suspect: suspect / total,
        pathologic: pathologic / total,
    }
}

/// Pathologic only when strictly greatest, then Suspect when strictly above
/// Normal, else Normal.
pub fn classify(p: &Probabilities) -> Classification {
    if p.pathologic > p.normal && p.pathologic > p.suspect {
        Classification::Pathologic
    } else if p.suspect > p.normal {
        Classification::Suspect
    } else {
        Classification::Normal
    }
}

fn score_at(features: &FeatureVector, timestamp: DateTime<Utc>) -> InferenceResult {
    let p = rule_probabilities(features);
    let classification = classify(&p);
    InferenceResult {
        classification,
        risk_score: round2(p.get(classification)),
        probabilities: Probabilities {
            normal: round2(p.normal),
            suspect: round2(p.suspect),
            pathologic: round2(p.pathologic),
        },
        model_version: FALLBACK_MODEL_VERSION.to_string(),
        timestamp,
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
