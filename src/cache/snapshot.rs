//! Snapshot Module
//!
//! The export/import shape of the whole store: an insertion-ordered map from
//! key to [`Item`], serialized as a JSON object.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cache::item::Item;
use crate::error::{CacheError, Result};

/// A copy of the store, key → item, in store order.
pub type Snapshot<V> = IndexMap<String, Item<V>>;

// == Snapshot Source ==
/// Anything `import` (or `CacheConfig::state`) accepts.
#[derive(Debug, Clone)]
pub enum SnapshotSource<V> {
    /// Already in the internal shape
    Snapshot(Snapshot<V>),
    /// A parsed JSON document that must be an object of items
    Json(Value),
    /// Serialized JSON text
    Text(String),
}

impl<V: DeserializeOwned> SnapshotSource<V> {
    /// Resolves the source into a snapshot.
    ///
    /// Only the root shape is checked: anything other than an object is an
    /// `InvalidSnapshot` error, as is an object whose entries are not items.
    pub fn into_snapshot(self) -> Result<Snapshot<V>> {
        let value = match self {
            SnapshotSource::Snapshot(snapshot) => return Ok(snapshot),
            SnapshotSource::Json(value) => value,
            SnapshotSource::Text(text) => serde_json::from_str(&text)
                .map_err(|e| CacheError::InvalidSnapshot(format!("unparseable text: {}", e)))?,
        };

        if !value.is_object() {
            return Err(CacheError::InvalidSnapshot(format!(
                "expected an object of items, got {}",
                json_type_name(&value)
            )));
        }

        serde_json::from_value(value).map_err(|e| CacheError::InvalidSnapshot(e.to_string()))
    }
}

impl<V> From<Snapshot<V>> for SnapshotSource<V> {
    fn from(snapshot: Snapshot<V>) -> Self {
        SnapshotSource::Snapshot(snapshot)
    }
}

impl<V> From<Value> for SnapshotSource<V> {
    fn from(value: Value) -> Self {
        SnapshotSource::Json(value)
    }
}

impl<V> From<String> for SnapshotSource<V> {
    fn from(text: String) -> Self {
        SnapshotSource::Text(text)
    }
}

impl<V> From<&str> for SnapshotSource<V> {
    fn from(text: &str) -> Self {
        SnapshotSource::Text(text.to_string())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
