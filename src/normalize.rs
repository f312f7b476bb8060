//! Record normalization
//!
//! Maps raw records onto the canonical output schema: canonical key names,
//! a fixed key order, and no empty values.

use serde_json::Value;

use crate::record::{is_empty_value, Record, POST_LABEL};

/// Canonical key order; unlisted keys follow in their original order
pub const PREFERRED_KEY_ORDER: [&str; 25] = [
    "id",
    "url",
    "title",
    "datetime",
    "dates",
    "location",
    "category",
    "label",
    "price",
    "longitude",
    "latitude",
    "mapAccuracy",
    "post",
    "notices",
    "phoneNumbers",
    "compensation",
    "employmentType",
    "jobTitle",
    "pics",
    "amenities",
    "availableFrom",
    "manufacturer",
    "model",
    "condition",
    "attributes",
];

/// Misspelled key variants seen in older exports
const KEY_ALIASES: [(&str, &str); 1] = [("attirbutes", "attributes")];

/// Normalize a record. Pure and total; applying it twice changes nothing.
pub fn normalize(record: &Record) -> Record {
    let mut out = record.clone();

    let blank_price = match out.get_mut("price") {
        Some(Value::String(price)) => {
            let trimmed = price.trim();
            if trimmed.len() != price.len() {
                *price = trimmed.to_string();
            }
            price.is_empty()
        }
        _ => false,
    };
    if blank_price {
        out.shift_remove("price");
    }

    for (alias, canonical) in KEY_ALIASES {
        if !out.contains_key(canonical) {
            if let Some(value) = out.shift_remove(alias) {
                out.insert(canonical.to_string(), value);
            }
        }
    }

    out.insert("label".to_string(), Value::String(POST_LABEL.to_string()));

    let mut ordered = Record::new();
    for key in PREFERRED_KEY_ORDER {
        if let Some(value) = out.shift_remove(key) {
            if !is_empty_value(&value) {
                ordered.insert(key.to_string(), value);
            }
        }
    }
    for (key, value) in out {
        if !is_empty_value(&value) {
            ordered.insert(key, value);
        }
    }

    ordered
}

/// Normalize every record, preserving order
pub fn normalize_all(records: &[Record]) -> Vec<Record> {
    records.iter().map(normalize).collect()
}
