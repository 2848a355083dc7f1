//! Export file writers
//!
//! Both writers are blocking and return the size of the written file.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::ExportError;
use crate::flatten::FlatRow;

/// Write a pretty-printed JSON array (4-space indent, keys sorted)
pub fn write_json(path: &Path, values: &[Value]) -> Result<u64, ExportError> {
    let mut writer = BufWriter::new(File::create(path)?);

    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    values
        .serialize(&mut serializer)
        .map_err(|e| ExportError::Serialization(e.to_string()))?;
    writer.flush()?;
    drop(writer);

    Ok(std::fs::metadata(path)?.len())
}

/// Write a CSV file with one header row and one row per flattened item
pub fn write_csv(
    path: &Path,
    rows: &[FlatRow],
    columns: &BTreeSet<String>,
) -> Result<u64, ExportError> {
    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;

    // An empty record would be written as `""`, so a batch without columns
    // produces an empty file instead
    if !columns.is_empty() {
        writer.write_record(columns).map_err(csv_error)?;
        for row in rows {
            writer
                .write_record(columns.iter().map(|column| cell(row.get(column))))
                .map_err(csv_error)?;
        }
    }
    writer.flush()?;
    drop(writer);

    Ok(std::fs::metadata(path)?.len())
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn csv_error(e: csv::Error) -> ExportError {
    match e.into_kind() {
        csv::ErrorKind::Io(e) => ExportError::Filesystem(e),
        other => ExportError::Serialization(format!("{:?}", other)),
    }
}
