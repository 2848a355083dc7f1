//! Nested mappings → fixed-column rows for tabular output
//!
//! Column names are dotted paths. Lists contribute one column group per
//! element (`media.0.bitrate`, `media.1.bitrate`, ...). Nulls, empty lists
//! and empty objects keep their column with an empty cell, so every field
//! the schema produced shows up in the header.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Column path → leaf value; `Value::Null` renders as an empty cell
pub type FlatRow = BTreeMap<String, Value>;

/// Flatten a batch; the column set is the sorted union over all rows
pub fn flatten(values: &[Value]) -> (Vec<FlatRow>, BTreeSet<String>) {
    let rows: Vec<FlatRow> = values.iter().map(flatten_one).collect();
    let columns = rows
        .iter()
        .flat_map(|row| row.keys().cloned())
        .collect::<BTreeSet<_>>();
    (rows, columns)
}

pub fn flatten_one(value: &Value) -> FlatRow {
    let mut row = FlatRow::new();
    flatten_into("", value, &mut row);
    row
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn flatten_into(prefix: &str, value: &Value, row: &mut FlatRow) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten_into(&join(prefix, key), child, row);
            }
        }
        Value::Array(values) if !values.is_empty() => {
            for (index, child) in values.iter().enumerate() {
                flatten_into(&join(prefix, &index.to_string()), child, row);
            }
        }
        Value::Object(_) | Value::Array(_) | Value::Null => {
            // The top-level object has no column of its own
            if !prefix.is_empty() {
                row.insert(prefix.to_string(), Value::Null);
            }
        }
        scalar => {
            row.insert(prefix.to_string(), scalar.clone());
        }
    }
}
