//! Declarative field schemas
//!
//! A [`Schema`] maps field names to how each field is produced:
//! read directly ([`Field::Scalar`]), derived by a function
//! ([`Field::Transform`]), or extracted recursively from related objects
//! ([`Field::Nested`]).
//!
//! Full per-type schemas live in [`registry`]; the detail-level tables that
//! select subsets of them live in [`levels`].

pub mod levels;
pub mod registry;
pub mod transforms;

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::source::SourceItem;

pub use levels::{levels_for, LevelIndex, FULL_SCHEMA_LEVEL};
pub use registry::schema_for;
pub use transforms::TransformError;

/// Derivation over an item; receives the item and the field name being built
pub type TransformFn = fn(&dyn SourceItem, &str) -> Result<Value, TransformError>;

/// Named derivation function
#[derive(Clone, Copy)]
pub struct Transform {
    name: &'static str,
    apply: TransformFn,
}

impl Transform {
    pub const fn new(name: &'static str, apply: TransformFn) -> Self {
        Self { name, apply }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn apply(&self, item: &dyn SourceItem, field: &str) -> Result<Value, TransformError> {
        (self.apply)(item, field)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transform({})", self.name)
    }
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// How one field is produced
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Scalar,
    Transform(Transform),
    Nested(Schema),
}

/// Field name → field definition, iterated in lexicographic order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema(BTreeMap<String, Field>);

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.0.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.0.get_mut(name)
    }

    /// Look up a field by its dotted path segments
    ///
    /// Every segment but the last must name a nested field.
    pub fn get_path(&self, segments: &[&str]) -> Option<&Field> {
        let (first, rest) = segments.split_first()?;
        let field = self.0.get(*first)?;
        if rest.is_empty() {
            return Some(field);
        }
        match field {
            Field::Nested(sub) => sub.get_path(rest),
            _ => None,
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, field: Field) -> Option<Field> {
        self.0.insert(name.into(), field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Field)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Dotted paths of every non-nested field, plus empty nested schemas
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_leaf_paths("", &mut paths);
        paths
    }

    fn collect_leaf_paths(&self, prefix: &str, out: &mut Vec<String>) {
        for (name, field) in &self.0 {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}.{}", prefix, name)
            };
            match field {
                Field::Nested(sub) if !sub.is_empty() => sub.collect_leaf_paths(&path, out),
                _ => out.push(path),
            }
        }
    }
}

/// Fluent construction for the static registry tables
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: BTreeMap<String, Field>,
}

impl SchemaBuilder {
    pub fn scalar(mut self, name: &str) -> Self {
        self.fields.insert(name.to_string(), Field::Scalar);
        self
    }

    pub fn scalars(mut self, names: &[&str]) -> Self {
        for name in names {
            self.fields.insert((*name).to_string(), Field::Scalar);
        }
        self
    }

    pub fn transform(mut self, name: &str, transform: Transform) -> Self {
        self.fields
            .insert(name.to_string(), Field::Transform(transform));
        self
    }

    pub fn nested(mut self, name: &str, schema: Schema) -> Self {
        self.fields.insert(name.to_string(), Field::Nested(schema));
        self
    }

    pub fn build(self) -> Schema {
        Schema(self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Schema {
        Schema::builder()
            .scalars(&["title", "year"])
            .nested(
                "media",
                Schema::builder()
                    .scalar("bitrate")
                    .nested("parts", Schema::builder().scalar("file").build())
                    .build(),
            )
            .nested("empty", Schema::new())
            .build()
    }

    #[test]
    fn test_get_path() {
        let schema = sample();
        assert_eq!(schema.get_path(&["title"]), Some(&Field::Scalar));
        assert_eq!(
            schema.get_path(&["media", "parts", "file"]),
            Some(&Field::Scalar)
        );
        assert!(matches!(
            schema.get_path(&["media", "parts"]),
            Some(Field::Nested(_))
        ));
        assert!(schema.get_path(&["title", "x"]).is_none());
        assert!(schema.get_path(&["media", "missing"]).is_none());
        assert!(schema.get_path(&[]).is_none());
    }

    #[test]
    fn test_leaf_paths_sorted() {
        let paths = sample().leaf_paths();
        assert_eq!(
            paths,
            vec!["empty", "media.bitrate", "media.parts.file", "title", "year"]
        );
    }

    #[test]
    fn test_transform_equality_by_name() {
        fn one(_: &dyn SourceItem, _: &str) -> Result<Value, TransformError> {
            Ok(Value::from(1))
        }
        fn two(_: &dyn SourceItem, _: &str) -> Result<Value, TransformError> {
            Ok(Value::from(2))
        }
        assert_eq!(Transform::new("a", one), Transform::new("a", two));
        assert_ne!(Transform::new("a", one), Transform::new("b", one));
        assert_eq!(format!("{:?}", Transform::new("a", one)), "Transform(a)");
    }
}
