//! Batch risk scoring.
//!
//! The orchestrator talks to any [`BatchScorer`]; in production that is the
//! external model process, with [`RuleBasedScorer`] standing in for the whole
//! batch whenever the model call fails.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScorerError;
use crate::records::FeatureVector;
use crate::schema::v1::{Classification, PredictionSource, Probabilities};

pub mod external;
pub mod orchestrator;
pub mod rules;

pub use external::{ExternalProcessScorer, ScorerConfig};
pub use orchestrator::InferenceOrchestrator;
pub use rules::{FALLBACK_MODEL_VERSION, RuleBasedScorer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceResult {
    pub classification: Classification,
    pub risk_score: f64,
    pub probabilities: Probabilities,
    pub model_version: String,
    pub timestamp: DateTime<Utc>,
}

pub trait BatchScorer: Send + Sync {
    fn name(&self) -> &'static str;

    /// One prediction per row, in row order.
    fn score_batch(&self, batch: &[FeatureVector]) -> Result<Vec<InferenceResult>, ScorerError>;
}

/// Predictions for one batch. Every row comes from the same source.
#[derive(Debug, Clone)]
pub struct InferenceOutcome {
    pub results: Vec<InferenceResult>,
    pub source: PredictionSource,
    pub failure: Option<String>,
}
