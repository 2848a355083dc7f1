//! Attribute resolution: full schema + level → effective schema
//!
//! Paths selected by every level up to the requested one are looked up in
//! the full schema and inserted into a fresh schema tree. Insertion merges
//! nested schemas by key union, so the result does not depend on the order
//! paths are listed in.

use std::collections::BTreeSet;
use thiserror::Error;
use tracing::warn;

use crate::schema::{Field, LevelIndex, Schema, FULL_SCHEMA_LEVEL};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Invalid export level: {level}")]
    InvalidLevel { level: u32 },
}

/// Resolve the effective schema for `level`
///
/// [`FULL_SCHEMA_LEVEL`] returns the full schema. Any other level must be a
/// key of `levels`. Paths missing from `schema` are logged and skipped.
pub fn resolve(schema: &Schema, levels: &LevelIndex, level: u32) -> Result<Schema, ResolveError> {
    if level == FULL_SCHEMA_LEVEL {
        return Ok(schema.clone());
    }
    if !levels.contains_key(&level) {
        return Err(ResolveError::InvalidLevel { level });
    }

    let paths: BTreeSet<&str> = levels
        .range(..=level)
        .flat_map(|(_, paths)| paths.iter().copied())
        .collect();

    let mut effective = Schema::new();
    for path in paths {
        let segments: Vec<&str> = path.split('.').collect();
        match schema.get_path(&segments) {
            Some(field) => insert_path(&mut effective, &segments, field),
            None => warn!(attribute = %path, "Unknown export attribute, skipping"),
        }
    }

    Ok(effective)
}

/// Check a level without building the schema
pub fn validate_level(levels: &LevelIndex, level: u32) -> Result<(), ResolveError> {
    if level == FULL_SCHEMA_LEVEL || levels.contains_key(&level) {
        Ok(())
    } else {
        Err(ResolveError::InvalidLevel { level })
    }
}

fn insert_path(target: &mut Schema, segments: &[&str], leaf: &Field) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    if rest.is_empty() {
        merge_field(target, first, leaf.clone());
        return;
    }

    if !matches!(target.get(first), Some(Field::Nested(_))) {
        target.insert(*first, Field::Nested(Schema::new()));
    }
    if let Some(Field::Nested(sub)) = target.get_mut(first) {
        insert_path(sub, rest, leaf);
    }
}

fn merge_field(target: &mut Schema, name: &str, incoming: Field) {
    if let (Some(Field::Nested(existing)), Field::Nested(sub)) = (target.get_mut(name), &incoming) {
        for (key, field) in sub.iter() {
            merge_field(existing, key, field.clone());
        }
        return;
    }
    target.insert(name, incoming);
}
