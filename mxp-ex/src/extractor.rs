//! Recursive extraction of source items against an effective schema
//!
//! [`extract`] is pure and synchronous. [`extract_batch`] runs it for many
//! items on the blocking thread pool with a bounded number in flight and
//! returns results in input order.

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::schema::{Field, Schema, TransformError};
use crate::source::{Attr, SourceItem};

/// Extraction failures
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Transform for '{field}' failed: {source}")]
    Transform {
        field: String,
        #[source]
        source: TransformError,
    },

    #[error("Extraction cancelled")]
    Cancelled,

    #[error("Extraction worker failed: {0}")]
    Worker(String),
}

/// Extract one item into a nested mapping with exactly the schema's keys
pub fn extract(item: &dyn SourceItem, schema: &Schema) -> Result<Value, ExtractError> {
    let mut out = Map::new();

    for (name, field) in schema.iter() {
        let value = match field {
            Field::Scalar => scalar(item.attr(name), name),
            Field::Transform(transform) => {
                transform
                    .apply(item, name)
                    .map_err(|source| ExtractError::Transform {
                        field: name.clone(),
                        source,
                    })?
            }
            Field::Nested(sub) => match item.attr(name) {
                Attr::Null => Value::Null,
                Attr::Item(child) => extract(child.as_ref(), sub)?,
                Attr::Items(children) => Value::Array(
                    children
                        .iter()
                        .map(|child| extract(child.as_ref(), sub))
                        .collect::<Result<Vec<_>, _>>()?,
                ),
                Attr::Value(value) => value,
            },
        };
        out.insert(name.clone(), value);
    }

    Ok(Value::Object(out))
}

fn scalar(attr: Attr, name: &str) -> Value {
    match attr {
        Attr::Null => Value::Null,
        Attr::Value(value) => value,
        other => {
            debug!(field = %name, kind = other.kind(), "Related object read as scalar, exporting null");
            Value::Null
        }
    }
}

/// Extract every item with at most `workers` extractions in flight
///
/// Output order matches input order. The first failure stops the batch,
/// and a cancelled token stops it before the next item starts.
pub async fn extract_batch(
    items: Vec<Arc<dyn SourceItem>>,
    schema: Arc<Schema>,
    workers: usize,
    cancel: &CancellationToken,
) -> Result<Vec<Value>, ExtractError> {
    let total = items.len();

    // Futures are built before streaming: a `map` closure over trait objects
    // does not satisfy `tokio::spawn`'s higher-ranked bounds
    let tasks: Vec<BoxFuture<'static, Result<Value, ExtractError>>> = items
        .into_iter()
        .map(|item| {
            let schema = schema.clone();
            let cancel = cancel.clone();
            async move {
                if cancel.is_cancelled() {
                    return Err(ExtractError::Cancelled);
                }
                tokio::task::spawn_blocking(move || extract(item.as_ref(), &schema))
                    .await
                    .map_err(|e| ExtractError::Worker(format!("Task join error: {}", e)))?
            }
            .boxed()
        })
        .collect();

    let results: Vec<Value> = stream::iter(tasks)
        .buffered(workers.max(1))
        .try_collect()
        .await?;

    debug!(items = total, workers = workers.max(1), "Batch extraction complete");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::transforms::REQUIRED_BANDWIDTHS;
    use crate::source::JsonItem;
    use serde_json::json;
    use std::time::Duration;

    fn schema() -> Schema {
        Schema::builder()
            .scalars(&["title", "year"])
            .nested(
                "media",
                Schema::builder()
                    .scalar("bitrate")
                    .nested("parts", Schema::builder().scalar("file").build())
                    .build(),
            )
            .nested("field", Schema::builder().scalar("name").build())
            .build()
    }

    #[test]
    fn test_extract_shapes() {
        let item = JsonItem::from_value(json!({
            "title": "Heat",
            "media": [
                {"bitrate": 100, "parts": [{"file": "/a.mkv"}, {"file": "/b.mkv"}]},
                {"bitrate": 200, "parts": []}
            ],
            "field": {"name": "title", "locked": true},
            "unused": "ignored"
        }))
        .unwrap();

        let value = extract(item.as_ref(), &schema()).unwrap();
        assert_eq!(
            value,
            json!({
                "title": "Heat",
                "year": null,
                "media": [
                    {"bitrate": 100, "parts": [{"file": "/a.mkv"}, {"file": "/b.mkv"}]},
                    {"bitrate": 200, "parts": []}
                ],
                "field": {"name": "title"}
            })
        );
    }

    #[test]
    fn test_absent_nested_is_null() {
        let item = JsonItem::from_value(json!({"title": "Heat", "year": 1995})).unwrap();
        let value = extract(item.as_ref(), &schema()).unwrap();
        assert_eq!(value["media"], Value::Null);
        assert_eq!(value["field"], Value::Null);
        assert_eq!(value["year"], json!(1995));
    }

    #[test]
    fn test_related_object_under_scalar_is_null() {
        let item = JsonItem::from_value(json!({"title": {"nested": true}})).unwrap();
        let value = extract(item.as_ref(), &Schema::builder().scalar("title").build()).unwrap();
        assert_eq!(value, json!({"title": null}));
    }

    #[test]
    fn test_transform_error_propagates() {
        let schema = Schema::builder()
            .transform("requiredBandwidths", REQUIRED_BANDWIDTHS)
            .build();
        let part = JsonItem::from_value(json!({"requiredBandwidths": "12,x"})).unwrap();
        let item = JsonItem::from_value(json!({"parts": [{"requiredBandwidths": "1,2"}]})).unwrap();

        let err = extract(part.as_ref(), &schema).unwrap_err();
        assert!(matches!(err, ExtractError::Transform { ref field, .. } if field == "requiredBandwidths"));

        // Nested errors surface too
        let nested = Schema::builder().nested("parts", schema.clone()).build();
        assert_eq!(
            extract(item.as_ref(), &nested).unwrap(),
            json!({"parts": [{"requiredBandwidths": [1, 2]}]})
        );
        let bad = JsonItem::from_value(json!({"parts": [{"requiredBandwidths": "oops"}]})).unwrap();
        assert!(extract(bad.as_ref(), &nested).is_err());
    }

    /// Item whose reads take longer the smaller its index
    #[derive(Debug)]
    struct SlowItem {
        index: u64,
        total: u64,
    }

    impl SourceItem for SlowItem {
        fn attr(&self, name: &str) -> Attr {
            std::thread::sleep(Duration::from_millis((self.total - self.index) * 3));
            match name {
                "index" => Attr::Value(Value::from(self.index)),
                _ => Attr::Null,
            }
        }
    }

    fn slow_items(total: u64) -> Vec<Arc<dyn SourceItem>> {
        (0..total)
            .map(|index| Arc::new(SlowItem { index, total }) as Arc<dyn SourceItem>)
            .collect()
    }

    #[tokio::test]
    async fn test_batch_preserves_input_order_for_any_pool_size() {
        let total = 8;
        let schema = Arc::new(Schema::builder().scalar("index").build());
        let cancel = CancellationToken::new();

        for workers in 1..=total as usize + 1 {
            let results = extract_batch(slow_items(total), schema.clone(), workers, &cancel)
                .await
                .unwrap();
            let order: Vec<u64> = results
                .iter()
                .map(|v| v["index"].as_u64().unwrap())
                .collect();
            assert_eq!(order, (0..total).collect::<Vec<_>>(), "workers = {}", workers);
        }
    }

    #[tokio::test]
    async fn test_batch_zero_workers_runs_sequentially() {
        let schema = Arc::new(Schema::builder().scalar("index").build());
        let results = extract_batch(slow_items(3), schema, 0, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_batch_cancelled() {
        let schema = Arc::new(Schema::builder().scalar("index").build());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = extract_batch(slow_items(4), schema, 2, &cancel).await;
        assert!(matches!(result, Err(ExtractError::Cancelled)));
    }

    #[tokio::test]
    async fn test_batch_stops_on_error() {
        let schema = Arc::new(
            Schema::builder()
                .transform("requiredBandwidths", REQUIRED_BANDWIDTHS)
                .build(),
        );
        let items: Vec<Arc<dyn SourceItem>> = vec![
            JsonItem::from_value(json!({"requiredBandwidths": "1"})).unwrap(),
            JsonItem::from_value(json!({"requiredBandwidths": "bad"})).unwrap(),
            JsonItem::from_value(json!({"requiredBandwidths": "3"})).unwrap(),
        ];

        let result = extract_batch(items, schema, 2, &CancellationToken::new()).await;
        assert!(matches!(result, Err(ExtractError::Transform { .. })));
    }

    #[tokio::test]
    async fn test_batch_inside_spawned_task() {
        let schema = Arc::new(Schema::builder().scalar("index").build());
        let handle = tokio::spawn(async move {
            let cancel = CancellationToken::new();
            extract_batch(slow_items(4), schema, 2, &cancel).await
        });

        let results = handle.await.unwrap().unwrap();
        let order: Vec<u64> = results
            .iter()
            .map(|v| v["index"].as_u64().unwrap())
            .collect();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let schema = Arc::new(Schema::new());
        let results = extract_batch(Vec::new(), schema, 4, &CancellationToken::new())
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
