use crate::records::FeatureVector;
use crate::schema::v1::{ClassDistribution, Patient};

/// Tally of the labels carried by the source file (pre-inference).
pub fn label_distribution(features: &[FeatureVector]) -> ClassDistribution {
    let mut dist = ClassDistribution::default();
    for f in features {
        dist.record_label(f.nsp);
    }
    dist
}

/// Tally of the final risk levels; this is the one reported to callers.
pub fn risk_distribution(patients: &[Patient]) -> ClassDistribution {
    let mut dist = ClassDistribution::default();
    for p in patients {
        dist.record_level(p.risk_level);
    }
    dist
}
