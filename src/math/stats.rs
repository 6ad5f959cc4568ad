//! Column statistics used by imputation and outlier capping.
//!
//! Note: Functions may reorder the input slice.

pub const IQR_FENCE: f64 = 1.5;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Value at index `floor(p * n)` of the sorted slice, no interpolation.
pub fn quantile_at_index(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let idx = ((p * sorted.len() as f64).floor() as usize).min(sorted.len() - 1);
    Some(sorted[idx])
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    /// Tukey fences over the non-negative values; the lower fence never
    /// drops below zero.
    pub fn from_values(values: &mut Vec<f64>) -> Option<Self> {
        values.retain(|v| v.is_finite() && *v >= 0.0);
        values.sort_by(f64::total_cmp);
        let q1 = quantile_at_index(values, 0.25)?;
        let q3 = quantile_at_index(values, 0.75)?;
        let iqr = q3 - q1;
        Some(Self {
            q1,
            q3,
            lower: (q1 - IQR_FENCE * iqr).max(0.0),
            upper: q3 + IQR_FENCE * iqr,
        })
    }

    pub fn clamp(&self, value: f64) -> f64 {
        if value < self.lower {
            self.lower
        } else if value > self.upper {
            self.upper
        } else {
            value
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}
