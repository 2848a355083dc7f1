//! Media source capability traits and the JSON snapshot adapter
//!
//! The extractor only ever asks an item for a named attribute. Everything
//! that knows how metadata is actually fetched lives behind [`MediaSource`].

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::models::MediaType;

/// Result of reading one attribute from a source item
#[derive(Debug, Clone)]
pub enum Attr {
    /// Attribute absent or null
    Null,
    /// Plain value (string, number, bool, list of scalars)
    Value(Value),
    /// Single related object
    Item(Arc<dyn SourceItem>),
    /// Ordered collection of related objects
    Items(Vec<Arc<dyn SourceItem>>),
}

impl Attr {
    pub fn is_null(&self) -> bool {
        matches!(self, Attr::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Attr::Value(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Integer view; numeric strings are accepted
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Attr::Value(Value::Number(n)) => n.as_i64(),
            Attr::Value(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Short description used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Attr::Null => "null",
            Attr::Value(Value::Bool(_)) => "bool",
            Attr::Value(Value::Number(_)) => "number",
            Attr::Value(Value::String(_)) => "string",
            Attr::Value(Value::Array(_)) => "list",
            Attr::Value(Value::Object(_)) => "object",
            Attr::Value(Value::Null) => "null",
            Attr::Item(_) => "related item",
            Attr::Items(_) => "related items",
        }
    }
}

/// Read-only view of one media object (item, media, part, stream, tag...)
pub trait SourceItem: Send + Sync + fmt::Debug {
    /// Read a named attribute; absent attributes are [`Attr::Null`]
    fn attr(&self, name: &str) -> Attr;

    /// Media type from the `type` attribute. A photo that is a directory is
    /// a photo album.
    fn media_type(&self) -> Option<MediaType> {
        let kind = self.attr("type");
        let kind = kind.as_str()?;
        if kind == "photo" && self.attr("TAG").as_str() == Some("Directory") {
            return Some(MediaType::PhotoAlbum);
        }
        kind.parse().ok()
    }

    fn title(&self) -> Option<String> {
        self.attr("title").as_str().map(str::to_string)
    }
}

/// A library section and its top-level items
#[derive(Debug, Clone)]
pub struct Library {
    pub section_id: i64,
    pub title: String,
    /// Raw media type reported by the source (validated by the caller)
    pub media_type: String,
    pub items: Vec<Arc<dyn SourceItem>>,
}

/// Media source errors
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid snapshot: {0}")]
    Invalid(String),
}

/// Where items and libraries come from
pub trait MediaSource: Send + Sync + fmt::Debug {
    fn get_item(&self, item_id: i64) -> Result<Option<Arc<dyn SourceItem>>, SourceError>;

    fn get_library(&self, section_id: i64) -> Result<Option<Library>, SourceError>;
}

// ============================================================================
// JSON snapshot adapter
// ============================================================================

/// Source item backed by a JSON object
///
/// Nested objects become related items; non-empty arrays made only of
/// objects become related collections. Everything else is a plain value.
#[derive(Debug)]
pub struct JsonItem {
    fields: BTreeMap<String, Node>,
}

#[derive(Debug)]
enum Node {
    Value(Value),
    Item(Arc<JsonItem>),
    Items(Vec<Arc<JsonItem>>),
}

impl Node {
    fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Node::Item(Arc::new(JsonItem::from_map(map))),
            Value::Array(values)
                if !values.is_empty() && values.iter().all(Value::is_object) =>
            {
                let items = values
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::Object(map) => Some(Arc::new(JsonItem::from_map(map))),
                        _ => None,
                    })
                    .collect();
                Node::Items(items)
            }
            other => Node::Value(other),
        }
    }
}

impl JsonItem {
    pub fn from_map(map: Map<String, Value>) -> Self {
        let fields = map
            .into_iter()
            .map(|(key, value)| (key, Node::from_value(value)))
            .collect();
        Self { fields }
    }

    /// Build from a JSON object; anything else is rejected
    pub fn from_value(value: Value) -> Result<Arc<Self>, SourceError> {
        match value {
            Value::Object(map) => Ok(Arc::new(Self::from_map(map))),
            other => Err(SourceError::Invalid(format!(
                "expected an object, found {}",
                other
            ))),
        }
    }

    fn rating_key(&self) -> Option<i64> {
        self.attr("ratingKey").as_i64()
    }

    fn children(&self) -> impl Iterator<Item = &Arc<JsonItem>> {
        self.fields.values().flat_map(|node| match node {
            Node::Item(item) => std::slice::from_ref(item).iter(),
            Node::Items(items) => items.iter(),
            Node::Value(_) => [].iter(),
        })
    }
}

impl SourceItem for JsonItem {
    fn attr(&self, name: &str) -> Attr {
        match self.fields.get(name) {
            None | Some(Node::Value(Value::Null)) => Attr::Null,
            Some(Node::Value(value)) => Attr::Value(value.clone()),
            Some(Node::Item(item)) => Attr::Item(item.clone()),
            Some(Node::Items(items)) => Attr::Items(
                items
                    .iter()
                    .map(|item| item.clone() as Arc<dyn SourceItem>)
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    libraries: Vec<LibraryFile>,
    /// Items outside any library (playlists)
    #[serde(default)]
    items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct LibraryFile {
    section_id: i64,
    title: String,
    #[serde(rename = "type")]
    media_type: String,
    #[serde(default)]
    items: Vec<Value>,
}

#[derive(Debug)]
struct SnapshotLibrary {
    section_id: i64,
    title: String,
    media_type: String,
    items: Vec<Arc<JsonItem>>,
}

/// Media source serving a JSON snapshot of a media server
///
/// ```json
/// {
///   "libraries": [
///     {"section_id": 1, "title": "Movies", "type": "movie", "items": [ ... ]}
///   ],
///   "items": [ {"ratingKey": 900, "type": "playlist", ... } ]
/// }
/// ```
///
/// Every object with a `ratingKey`, at any depth, can be exported on its own.
#[derive(Debug)]
pub struct JsonSnapshotSource {
    libraries: Vec<SnapshotLibrary>,
    index: HashMap<i64, Arc<JsonItem>>,
}

impl JsonSnapshotSource {
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, SourceError> {
        let value: Value =
            serde_json::from_str(content).map_err(|e| SourceError::Invalid(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, SourceError> {
        let file: SnapshotFile =
            serde_json::from_value(value).map_err(|e| SourceError::Invalid(e.to_string()))?;

        let mut index = HashMap::new();
        let mut libraries = Vec::with_capacity(file.libraries.len());

        for library in file.libraries {
            let items = library
                .items
                .into_iter()
                .map(JsonItem::from_value)
                .collect::<Result<Vec<_>, _>>()?;
            for item in &items {
                index_item(item, &mut index);
            }
            libraries.push(SnapshotLibrary {
                section_id: library.section_id,
                title: library.title,
                media_type: library.media_type,
                items,
            });
        }

        for value in file.items {
            let item = JsonItem::from_value(value)?;
            index_item(&item, &mut index);
        }

        tracing::debug!(
            libraries = libraries.len(),
            items = index.len(),
            "Loaded media snapshot"
        );

        Ok(Self { libraries, index })
    }
}

/// Index every object carrying a ratingKey; the first occurrence wins
fn index_item(item: &Arc<JsonItem>, index: &mut HashMap<i64, Arc<JsonItem>>) {
    if let Some(key) = item.rating_key() {
        index.entry(key).or_insert_with(|| item.clone());
    }
    for child in item.children() {
        index_item(child, index);
    }
}

impl MediaSource for JsonSnapshotSource {
    fn get_item(&self, item_id: i64) -> Result<Option<Arc<dyn SourceItem>>, SourceError> {
        Ok(self
            .index
            .get(&item_id)
            .map(|item| item.clone() as Arc<dyn SourceItem>))
    }

    fn get_library(&self, section_id: i64) -> Result<Option<Library>, SourceError> {
        Ok(self
            .libraries
            .iter()
            .find(|library| library.section_id == section_id)
            .map(|library| Library {
                section_id: library.section_id,
                title: library.title.clone(),
                media_type: library.media_type.clone(),
                items: library
                    .items
                    .iter()
                    .map(|item| item.clone() as Arc<dyn SourceItem>)
                    .collect(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot() -> JsonSnapshotSource {
        JsonSnapshotSource::from_value(json!({
            "libraries": [{
                "section_id": 2,
                "title": "TV Shows",
                "type": "show",
                "items": [{
                    "ratingKey": 100,
                    "type": "show",
                    "title": "Show",
                    "seasons": [{
                        "ratingKey": "101",
                        "type": "season",
                        "title": "Season 1",
                        "episodes": [{"ratingKey": 102, "type": "episode", "title": "Pilot"}]
                    }]
                }]
            }],
            "items": [{"ratingKey": 900, "type": "playlist", "title": "Favorites"}]
        }))
        .unwrap()
    }

    #[test]
    fn test_nested_items_are_indexed() {
        let source = snapshot();
        let episode = source.get_item(102).unwrap().expect("episode indexed");
        assert_eq!(episode.title().as_deref(), Some("Pilot"));
        assert_eq!(episode.media_type(), Some(MediaType::Episode));

        // String rating keys are accepted
        assert!(source.get_item(101).unwrap().is_some());
        assert!(source.get_item(900).unwrap().is_some());
        assert!(source.get_item(12345).unwrap().is_none());
    }

    #[test]
    fn test_library_lookup() {
        let source = snapshot();
        let library = source.get_library(2).unwrap().expect("library exists");
        assert_eq!(library.title, "TV Shows");
        assert_eq!(library.media_type, "show");
        assert_eq!(library.items.len(), 1);
        assert!(source.get_library(99).unwrap().is_none());
    }

    #[test]
    fn test_attr_shapes() {
        let item = JsonItem::from_value(json!({
            "title": "Movie",
            "missing": null,
            "locations": ["/a.mkv"],
            "empty": [],
            "media": [{"id": 1}, {"id": 2}],
            "field": {"name": "title"}
        }))
        .unwrap();

        assert!(item.attr("nope").is_null());
        assert!(item.attr("missing").is_null());
        assert!(matches!(item.attr("locations"), Attr::Value(Value::Array(_))));
        assert!(matches!(item.attr("empty"), Attr::Value(Value::Array(ref v)) if v.is_empty()));
        assert!(matches!(item.attr("media"), Attr::Items(ref v) if v.len() == 2));
        assert!(matches!(item.attr("field"), Attr::Item(_)));
    }

    #[test]
    fn test_photo_directory_is_photo_album() {
        let album = JsonItem::from_value(json!({"type": "photo", "TAG": "Directory"})).unwrap();
        let photo = JsonItem::from_value(json!({"type": "photo", "TAG": "Photo"})).unwrap();
        assert_eq!(album.media_type(), Some(MediaType::PhotoAlbum));
        assert_eq!(photo.media_type(), Some(MediaType::Photo));
    }

    #[test]
    fn test_invalid_snapshot() {
        assert!(JsonSnapshotSource::from_json_str("[1, 2]").is_err());
        assert!(JsonSnapshotSource::from_value(json!({"items": [1]})).is_err());
    }
}
