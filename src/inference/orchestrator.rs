use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::error::ScorerError;
use crate::inference::{BatchScorer, InferenceOutcome, InferenceResult, RuleBasedScorer};
use crate::records::FeatureVector;
use crate::schema::v1::PredictionSource;

const PROBABILITY_SUM_TOLERANCE: f64 = 0.05;

/// One model call per batch, no retry. Any failure sends the whole batch to
/// the rule-based scorer; real and fallback predictions never mix.
pub struct InferenceOrchestrator {
    primary: Option<Arc<dyn BatchScorer>>,
    fallback: RuleBasedScorer,
}

impl InferenceOrchestrator {
    pub fn new(primary: Arc<dyn BatchScorer>, fallback: RuleBasedScorer) -> Self {
        Self {
            primary: Some(primary),
            fallback,
        }
    }

    pub fn fallback_only(fallback: RuleBasedScorer) -> Self {
        Self {
            primary: None,
            fallback,
        }
    }

    pub fn run(&self, batch: &[FeatureVector]) -> InferenceOutcome {
        let Some(primary) = &self.primary else {
            info!(rows = batch.len(), "scorer_disabled; using rule-based scorer");
            return self.fall_back(batch, None);
        };

        let start = Instant::now();
        let attempt = primary
            .score_batch(batch)
            .and_then(|results| check_predictions(results, batch.len()));
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match attempt {
            Ok(results) => {
                info!(
                    scorer = primary.name(),
                    rows = results.len(),
                    elapsed_ms,
                    "scorer_succeeded"
                );
                InferenceOutcome {
                    results,
                    source: PredictionSource::Model,
                    failure: None,
                }
            }
            Err(err) => {
                warn!(
                    scorer = primary.name(),
                    rows = batch.len(),
                    elapsed_ms,
                    error = %err,
                    "scorer_fallback"
                );
                self.fall_back(batch, Some(err.to_string()))
            }
        }
    }

    fn fall_back(&self, batch: &[FeatureVector], failure: Option<String>) -> InferenceOutcome {
        InferenceOutcome {
            results: self.fallback.score_all(batch),
            source: PredictionSource::Fallback,
            failure,
        }
    }
}

/// Structural checks on whatever the model produced.
pub fn check_predictions(
    results: Vec<InferenceResult>,
    expected: usize,
) -> Result<Vec<InferenceResult>, ScorerError> {
    if results.len() != expected {
        return Err(ScorerError::RowCount {
            expected,
            got: results.len(),
        });
    }
    for (row, r) in results.iter().enumerate() {
        let invalid = |reason: String| ScorerError::InvalidPrediction { row, reason };
        if !r.risk_score.is_finite() || !(0.0..=1.0).contains(&r.risk_score) {
            return Err(invalid(format!("riskScore {} outside [0, 1]", r.risk_score)));
        }
        let p = &r.probabilities;
        if [p.normal, p.suspect, p.pathologic]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(invalid("negative or non-finite probability".to_string()));
        }
        if (p.sum() - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            return Err(invalid(format!("probabilities sum to {:.4}", p.sum())));
        }
        if r.model_version.trim().is_empty() {
            return Err(invalid("empty modelVersion".to_string()));
        }
    }
    Ok(results)
}
