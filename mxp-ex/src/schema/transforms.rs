//! Derived-field functions referenced by the schema registry
//!
//! Each transform receives the item being extracted and the name of the
//! field it produces. Errors are returned, never swallowed: a failing
//! transform fails the whole extraction.

use serde_json::Value;
use thiserror::Error;

use mxp_common::human::{format_human_duration, format_human_file_size};
use mxp_common::time::{to_iso_date, to_iso_datetime};

use super::Transform;
use crate::extractor::{self, ExtractError};
use crate::schema::registry::schema_for;
use crate::source::{Attr, SourceItem};

/// Transform failures
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Field '{field}': expected {expected}, found {found}")]
    UnexpectedType {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Field '{field}': cannot parse '{value}'")]
    Parse { field: String, value: String },

    #[error("Field '{field}': unknown child media type")]
    UnknownMediaType { field: String },

    #[error("Field '{field}': child extraction failed: {source}")]
    Child {
        field: String,
        #[source]
        source: Box<ExtractError>,
    },
}

pub const ISO_DATETIME: Transform = Transform::new("iso_datetime", iso_datetime);
pub const ISO_DATE: Transform = Transform::new("iso_date", iso_date);
pub const HUMAN_DURATION: Transform = Transform::new("human_duration", human_duration);
pub const HUMAN_FILE_SIZE: Transform = Transform::new("human_file_size", human_file_size);
pub const REQUIRED_BANDWIDTHS: Transform =
    Transform::new("required_bandwidths", required_bandwidths);
pub const HDR: Transform = Transform::new("hdr", hdr);
pub const CHILDREN: Transform = Transform::new("children", children);

fn unexpected(field: &str, expected: &'static str, attr: &Attr) -> TransformError {
    TransformError::UnexpectedType {
        field: field.to_string(),
        expected,
        found: attr.kind(),
    }
}

/// Unix timestamp → `YYYY-MM-DDTHH:MM:SS`; already-formatted strings pass through
fn iso_timestamp(
    item: &dyn SourceItem,
    field: &str,
    format: fn(i64) -> Option<String>,
) -> Result<Value, TransformError> {
    let attr = item.attr(field);
    match &attr {
        Attr::Null => Ok(Value::Null),
        Attr::Value(Value::Number(n)) => {
            let seconds = n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .ok_or_else(|| unexpected(field, "a timestamp", &attr))?;
            Ok(format(seconds).map(Value::String).unwrap_or(Value::Null))
        }
        Attr::Value(Value::String(s)) => Ok(Value::String(s.clone())),
        _ => Err(unexpected(field, "a timestamp", &attr)),
    }
}

pub fn iso_datetime(item: &dyn SourceItem, field: &str) -> Result<Value, TransformError> {
    iso_timestamp(item, field, to_iso_datetime)
}

pub fn iso_date(item: &dyn SourceItem, field: &str) -> Result<Value, TransformError> {
    iso_timestamp(item, field, to_iso_date)
}

/// `duration` (milliseconds) as "1 hr 30 mins"; a missing duration counts as zero
pub fn human_duration(item: &dyn SourceItem, _field: &str) -> Result<Value, TransformError> {
    let attr = item.attr("duration");
    let ms = match &attr {
        Attr::Null => 0,
        _ => attr
            .as_i64()
            .ok_or_else(|| unexpected("duration", "a number", &attr))?,
    };
    Ok(Value::String(format_human_duration(ms)))
}

/// `size` (bytes) as "1.5 GiB"; a missing size counts as zero
pub fn human_file_size(item: &dyn SourceItem, _field: &str) -> Result<Value, TransformError> {
    let attr = item.attr("size");
    let bytes = match &attr {
        Attr::Null => 0,
        _ => attr
            .as_i64()
            .ok_or_else(|| unexpected("size", "a number", &attr))?,
    };
    Ok(Value::String(format_human_file_size(bytes.max(0) as u64)))
}

/// Comma-separated bandwidth list → integer list; empty → null
pub fn required_bandwidths(item: &dyn SourceItem, field: &str) -> Result<Value, TransformError> {
    let attr = item.attr(field);
    match &attr {
        Attr::Null => Ok(Value::Null),
        Attr::Value(Value::String(s)) if s.is_empty() => Ok(Value::Null),
        Attr::Value(Value::String(s)) => {
            let values = s
                .split(',')
                .map(|b| {
                    b.trim()
                        .parse::<i64>()
                        .map(Value::from)
                        .map_err(|_| TransformError::Parse {
                            field: field.to_string(),
                            value: s.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(values))
        }
        Attr::Value(Value::Array(values)) => Ok(Value::Array(values.clone())),
        _ => Err(unexpected(field, "a comma-separated list", &attr)),
    }
}

/// High dynamic range: more than 8 bits per channel in the BT.2020 colour space
pub fn hdr(item: &dyn SourceItem, _field: &str) -> Result<Value, TransformError> {
    let bit_depth = item.attr("bitDepth").as_i64().unwrap_or(0);
    let color_space = item.attr("colorSpace");
    Ok(Value::Bool(
        bit_depth > 8 && color_space.as_str() == Some("bt2020nc"),
    ))
}

/// Related child items, each extracted with its own media type's full schema
pub fn children(item: &dyn SourceItem, field: &str) -> Result<Value, TransformError> {
    let attr = item.attr(field);
    match attr {
        Attr::Null => Ok(Value::Null),
        Attr::Item(child) => extract_child(child.as_ref(), field),
        Attr::Items(children) => children
            .iter()
            .map(|child| extract_child(child.as_ref(), field))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Attr::Value(Value::Array(ref values)) if values.is_empty() => Ok(Value::Array(Vec::new())),
        other => Err(unexpected(field, "related items", &other)),
    }
}

fn extract_child(child: &dyn SourceItem, field: &str) -> Result<Value, TransformError> {
    let media_type = child
        .media_type()
        .ok_or_else(|| TransformError::UnknownMediaType {
            field: field.to_string(),
        })?;
    extractor::extract(child, schema_for(media_type)).map_err(|e| TransformError::Child {
        field: field.to_string(),
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::JsonItem;
    use serde_json::json;

    #[test]
    fn test_iso_datetime() {
        let item = JsonItem::from_value(json!({
            "addedAt": 1_600_000_000,
            "updatedAt": "2020-09-13T12:26:40",
            "bad": true
        }))
        .unwrap();

        assert_eq!(
            iso_datetime(item.as_ref(), "addedAt").unwrap(),
            json!("2020-09-13T12:26:40")
        );
        assert_eq!(
            iso_date(item.as_ref(), "addedAt").unwrap(),
            json!("2020-09-13")
        );
        assert_eq!(
            iso_datetime(item.as_ref(), "updatedAt").unwrap(),
            json!("2020-09-13T12:26:40")
        );
        assert_eq!(iso_datetime(item.as_ref(), "missing").unwrap(), Value::Null);
        assert!(iso_datetime(item.as_ref(), "bad").is_err());
    }

    #[test]
    fn test_human_duration_and_size() {
        let item = JsonItem::from_value(json!({"duration": 5_400_000, "size": 1536})).unwrap();
        assert_eq!(
            human_duration(item.as_ref(), "durationHuman").unwrap(),
            json!("1 hr 30 mins")
        );
        assert_eq!(
            human_file_size(item.as_ref(), "sizeHuman").unwrap(),
            json!("1.5 KiB")
        );

        let empty = JsonItem::from_value(json!({})).unwrap();
        assert_eq!(
            human_duration(empty.as_ref(), "durationHuman").unwrap(),
            json!("0 mins")
        );
        assert_eq!(
            human_file_size(empty.as_ref(), "sizeHuman").unwrap(),
            json!("0 B")
        );
    }

    #[test]
    fn test_required_bandwidths() {
        let item = JsonItem::from_value(json!({
            "ok": "1000,2000,3000",
            "empty": "",
            "broken": "1000,abc"
        }))
        .unwrap();

        assert_eq!(
            required_bandwidths(item.as_ref(), "ok").unwrap(),
            json!([1000, 2000, 3000])
        );
        assert_eq!(
            required_bandwidths(item.as_ref(), "empty").unwrap(),
            Value::Null
        );
        assert_eq!(
            required_bandwidths(item.as_ref(), "missing").unwrap(),
            Value::Null
        );
        assert!(matches!(
            required_bandwidths(item.as_ref(), "broken"),
            Err(TransformError::Parse { .. })
        ));
    }

    #[test]
    fn test_hdr() {
        let hdr_stream =
            JsonItem::from_value(json!({"bitDepth": 10, "colorSpace": "bt2020nc"})).unwrap();
        let sdr_stream =
            JsonItem::from_value(json!({"bitDepth": 8, "colorSpace": "bt709"})).unwrap();
        let bare = JsonItem::from_value(json!({})).unwrap();

        assert_eq!(hdr(hdr_stream.as_ref(), "hdr").unwrap(), json!(true));
        assert_eq!(hdr(sdr_stream.as_ref(), "hdr").unwrap(), json!(false));
        assert_eq!(hdr(bare.as_ref(), "hdr").unwrap(), json!(false));
    }

    #[test]
    fn test_children_use_child_schema() {
        let season = JsonItem::from_value(json!({
            "type": "season",
            "title": "Season 1",
            "episodes": [
                {"type": "episode", "title": "Pilot", "index": 1},
                {"type": "episode", "title": "Second", "index": 2}
            ]
        }))
        .unwrap();

        let value = children(season.as_ref(), "episodes").unwrap();
        let episodes = value.as_array().expect("list of episodes");
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0]["title"], json!("Pilot"));
        assert_eq!(episodes[1]["index"], json!(2));
        // Full episode schema applies, so unset fields are present as null
        assert_eq!(episodes[0]["summary"], Value::Null);
    }

    #[test]
    fn test_children_unknown_type_fails() {
        let show = JsonItem::from_value(json!({
            "type": "show",
            "seasons": [{"type": "hologram"}]
        }))
        .unwrap();
        assert!(matches!(
            children(show.as_ref(), "seasons"),
            Err(TransformError::UnknownMediaType { .. })
        ));
        assert_eq!(children(show.as_ref(), "missing").unwrap(), Value::Null);
    }
}
