//! Incremental merge of fetched JSON into cached snapshots.
//!
//! Incoming data is expressed as a [`Patch`], which keeps "key present but
//! undefined" apart from an explicit `null`:
//!
//! - `Undefined` leaves the cached field untouched,
//! - `Null` clears it,
//! - nested objects merge recursively,
//! - everything else (scalars, arrays) replaces the cached field.
//!
//! Keys missing from the patch are retained. When the merged value is equal
//! to the cached one the cached `Arc` is handed back, so callers can detect
//! "nothing changed" with [`Arc::ptr_eq`].

use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Cached representation of one entity
pub type Snapshot = Arc<Value>;

/// Incoming value to merge into a snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    Undefined,
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Patch>),
}

impl Patch {
    /// Build an object patch from `(key, patch)` pairs
    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Patch)>,
    {
        Patch::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// The JSON value this patch stands for; `None` if undefined
    pub fn to_value(&self) -> Option<Value> {
        Some(match self {
            Patch::Undefined => return None,
            Patch::Null => Value::Null,
            Patch::Bool(b) => Value::Bool(*b),
            Patch::Number(n) => Value::Number(n.clone()),
            Patch::String(s) => Value::String(s.clone()),
            Patch::Array(items) => Value::Array(items.clone()),
            Patch::Object(fields) => Value::Object(
                fields
                    .iter()
                    .filter_map(|(k, v)| v.to_value().map(|v| (k.clone(), v)))
                    .collect(),
            ),
        })
    }
}

impl From<&Value> for Patch {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Patch::Null,
            Value::Bool(b) => Patch::Bool(*b),
            Value::Number(n) => Patch::Number(n.clone()),
            Value::String(s) => Patch::String(s.clone()),
            Value::Array(items) => Patch::Array(items.clone()),
            Value::Object(map) => {
                Patch::Object(map.iter().map(|(k, v)| (k.clone(), Patch::from(v))).collect())
            }
        }
    }
}

impl From<Value> for Patch {
    fn from(value: Value) -> Self {
        Patch::from(&value)
    }
}

impl From<&str> for Patch {
    fn from(value: &str) -> Self {
        Patch::String(value.to_string())
    }
}

impl<T: Into<Patch>> From<Option<T>> for Patch {
    /// `None` is treated as undefined, not null
    fn from(value: Option<T>) -> Self {
        value.map_or(Patch::Undefined, Into::into)
    }
}

/// Merge `incoming` into `previous`, producing a fresh value.
///
/// Returns `None` only when `incoming` is undefined at the top level.
pub fn merge_value(previous: Option<&Value>, incoming: &Patch) -> Option<Value> {
    let Patch::Object(fields) = incoming else {
        return incoming.to_value();
    };

    let mut merged: Map<String, Value> = match previous {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };

    for (key, patch) in fields {
        match patch {
            Patch::Undefined => {}
            Patch::Object(_) => {
                let nested = merge_value(merged.get(key), patch);
                if let Some(value) = nested {
                    merged.insert(key.clone(), value);
                }
            }
            other => {
                if let Some(value) = other.to_value() {
                    merged.insert(key.clone(), value);
                }
            }
        }
    }

    Some(Value::Object(merged))
}

/// Merge a patch into an optional snapshot, reusing the snapshot when the
/// result is unchanged
pub fn merge_snapshot(previous: Option<&Snapshot>, incoming: &Patch) -> Option<Snapshot> {
    let merged = merge_value(previous.map(|p| p.as_ref()), incoming)?;
    match previous {
        Some(prev) if **prev == merged => Some(Arc::clone(prev)),
        _ => Some(Arc::new(merged)),
    }
}

/// Merge a fetched JSON document into a snapshot.
///
/// Fetched JSON has no undefined fields, so keys the server omitted are kept
/// and explicit nulls clear.
pub fn merge(previous: &Snapshot, incoming: &Value) -> Snapshot {
    match merge_snapshot(Some(previous), &Patch::from(incoming)) {
        Some(snapshot) => snapshot,
        None => Arc::clone(previous),
    }
}
