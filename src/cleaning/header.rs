use std::collections::HashMap;

use crate::records::RawRecord;

/// Values that only ever appear in a CTG header row.
const HEADER_TOKENS: [&str; 8] = ["LB", "AC", "FM", "UC", "NSP", "CLASS", "ASTV", "MSTV"];

#[derive(Debug)]
pub struct HeaderRepair {
    pub records: Vec<RawRecord>,
    pub repaired: bool,
}

pub fn looks_like_header(record: &RawRecord) -> bool {
    record.values().any(|value| {
        value.as_text().is_some_and(|text| {
            let text = text.trim();
            HEADER_TOKENS
                .iter()
                .any(|token| text.eq_ignore_ascii_case(token))
        })
    })
}

/// Promotes a disguised header row to keys and uppercases every key.
pub fn normalize_headers(mut records: Vec<RawRecord>) -> HeaderRepair {
    let header_map = match records.first() {
        Some(first) if looks_like_header(first) => Some(build_header_map(first)),
        _ => None,
    };
    let repaired = header_map.is_some();
    if repaired {
        records.remove(0);
    }

    let records = records
        .into_iter()
        .map(|record| rekey(record, header_map.as_ref()))
        .collect();

    HeaderRepair { records, repaired }
}

fn build_header_map(first: &RawRecord) -> HashMap<String, String> {
    first
        .iter()
        .filter_map(|(key, value)| {
            let name = value.as_text()?.trim();
            (!name.is_empty()).then(|| (key.clone(), name.to_uppercase()))
        })
        .collect()
}

fn rekey(record: RawRecord, header_map: Option<&HashMap<String, String>>) -> RawRecord {
    let mut out = RawRecord::with_capacity(record.len());
    for (key, value) in record {
        let name = header_map
            .and_then(|map| map.get(&key))
            .map(String::as_str)
            .unwrap_or(key.as_str())
            .to_uppercase();
        out.insert(name, value);
    }
    out
}
