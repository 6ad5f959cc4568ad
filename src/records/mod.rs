//! Raw spreadsheet records and the typed CTG feature vector.
//!
//! Raw records keep whatever keys the spreadsheet had. Only the imputer turns
//! them into [`FeatureVector`]s; everything after that stage is typed.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

pub const NUM_FEATURES: usize = 21;

pub const LABEL_KEY: &str = "NSP";
pub const CLASS_KEY: &str = "CLASS";
pub const FILENAME_KEY: &str = "FILENAME";

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl CellValue {
    /// Finite numeric reading of the cell. Text is trimmed before parsing.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            CellValue::Number(v) => *v,
            CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
            CellValue::Empty | CellValue::Bool(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Empty, zero, NaN, blank text and `false` all count as "not set".
    pub fn is_unset(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Number(v) => *v == 0.0 || v.is_nan(),
            CellValue::Text(s) => s.is_empty(),
            CellValue::Bool(b) => !b,
        }
    }

    pub fn to_display(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => {
                Some(format!("{}", *v as i64))
            }
            CellValue::Number(v) => Some(v.to_string()),
            CellValue::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            CellValue::Bool(b) => Some(b.to_string()),
        }
    }
}

/// One spreadsheet row, keyed by column name in sheet order.
pub type RawRecord = IndexMap<String, CellValue>;

/// Exact key first, then a case-insensitive scan.
pub fn lookup<'a>(record: &'a RawRecord, key: &str) -> Option<&'a CellValue> {
    record.get(key).or_else(|| {
        record
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Lb,
    Ac,
    Fm,
    Uc,
    Astv,
    Mstv,
    Altv,
    Mltv,
    Dl,
    Ds,
    Dp,
    Width,
    Min,
    Max,
    Nmax,
    Nzeros,
    Mode,
    Mean,
    Median,
    Variance,
    Tendency,
}

impl Feature {
    pub const ALL: [Feature; NUM_FEATURES] = [
        Feature::Lb,
        Feature::Ac,
        Feature::Fm,
        Feature::Uc,
        Feature::Astv,
        Feature::Mstv,
        Feature::Altv,
        Feature::Mltv,
        Feature::Dl,
        Feature::Ds,
        Feature::Dp,
        Feature::Width,
        Feature::Min,
        Feature::Max,
        Feature::Nmax,
        Feature::Nzeros,
        Feature::Mode,
        Feature::Mean,
        Feature::Median,
        Feature::Variance,
        Feature::Tendency,
    ];

    /// Columns subject to IQR capping.
    pub const CRITICAL: [Feature; 6] = [
        Feature::Lb,
        Feature::Ac,
        Feature::Fm,
        Feature::Uc,
        Feature::Astv,
        Feature::Mstv,
    ];

    /// A row without these is not a CTG row.
    pub const REQUIRED: [Feature; 3] = [Feature::Lb, Feature::Ac, Feature::Fm];

    pub const FINGERPRINT: [Feature; 5] = [
        Feature::Lb,
        Feature::Ac,
        Feature::Fm,
        Feature::Uc,
        Feature::Astv,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Feature::Lb => "LB",
            Feature::Ac => "AC",
            Feature::Fm => "FM",
            Feature::Uc => "UC",
            Feature::Astv => "ASTV",
            Feature::Mstv => "MSTV",
            Feature::Altv => "ALTV",
            Feature::Mltv => "MLTV",
            Feature::Dl => "DL",
            Feature::Ds => "DS",
            Feature::Dp => "DP",
            Feature::Width => "WIDTH",
            Feature::Min => "MIN",
            Feature::Max => "MAX",
            Feature::Nmax => "NMAX",
            Feature::Nzeros => "NZEROS",
            Feature::Mode => "MODE",
            Feature::Mean => "MEAN",
            Feature::Median => "MEDIAN",
            Feature::Variance => "VARIANCE",
            Feature::Tendency => "TENDENCY",
        }
    }

    /// Key casing the external model was trained with.
    pub fn scorer_key(self) -> &'static str {
        match self {
            Feature::Width => "Width",
            Feature::Min => "Min",
            Feature::Max => "Max",
            Feature::Nmax => "Nmax",
            Feature::Nzeros => "Nzeros",
            Feature::Mode => "Mode",
            Feature::Mean => "Mean",
            Feature::Median => "Median",
            Feature::Variance => "Variance",
            Feature::Tendency => "Tendency",
            other => other.name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub values: [f64; NUM_FEATURES],
    /// 0 = unknown, 1 = normal, 2 = suspect, 3 = pathologic.
    pub nsp: u8,
    pub file_name: Option<String>,
}

impl FeatureVector {
    pub fn new(values: [f64; NUM_FEATURES]) -> Self {
        Self {
            values,
            nsp: 0,
            file_name: None,
        }
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    pub fn set(&mut self, feature: Feature, value: f64) {
        self.values[feature.index()] = value;
    }

    pub fn with_label(&self, nsp: u8) -> Self {
        let mut out = self.clone();
        out.nsp = nsp;
        out
    }

    /// Back to the raw form, with canonical keys.
    pub fn to_record(&self) -> RawRecord {
        let mut record = RawRecord::with_capacity(NUM_FEATURES + 2);
        for feature in Feature::ALL {
            record.insert(
                feature.name().to_string(),
                CellValue::Number(self.get(feature)),
            );
        }
        record.insert(LABEL_KEY.to_string(), CellValue::Number(self.nsp as f64));
        if let Some(name) = &self.file_name {
            record.insert(FILENAME_KEY.to_string(), CellValue::Text(name.clone()));
        }
        record
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = NUM_FEATURES + 1 + usize::from(self.file_name.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for feature in Feature::ALL {
            map.serialize_entry(feature.name(), &self.get(feature))?;
        }
        map.serialize_entry(LABEL_KEY, &self.nsp)?;
        if let Some(name) = &self.file_name {
            map.serialize_entry(FILENAME_KEY, name)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_cells_parse_as_numbers() {
        assert_eq!(CellValue::Text(" 120 ".into()).as_number(), Some(120.0));
        assert_eq!(CellValue::Text("n/a".into()).as_number(), None);
        assert_eq!(CellValue::Text("NaN".into()).as_number(), None);
        assert_eq!(CellValue::Bool(true).as_number(), None);
    }

    #[test]
    fn lookup_ignores_case() {
        let mut record = RawRecord::new();
        record.insert("FileName".into(), CellValue::Text("a.txt".into()));
        assert!(lookup(&record, FILENAME_KEY).is_some());
    }

    #[test]
    fn feature_order_matches_index() {
        for (i, f) in Feature::ALL.iter().enumerate() {
            assert_eq!(f.index(), i);
        }
        assert_eq!(Feature::Nzeros.scorer_key(), "Nzeros");
        assert_eq!(Feature::Astv.scorer_key(), "ASTV");
    }
}
