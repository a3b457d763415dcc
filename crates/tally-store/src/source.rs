//! Collection sources: where list data comes from.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Result, SourceError};

/// Loads a whole collection in one request.
///
/// # Design Notes
///
/// - **Sync-only**: sources are synchronous. An async transport should block
///   internally or be wrapped.
/// - **All or nothing**: a source either returns every record or an error.
///   Partial loads are not modelled, and the store never retries.
pub trait CollectionSource {
    /// The record type produced.
    type Item;

    /// Fetches the full collection.
    fn load(&self) -> Result<Vec<Self::Item>>;

    /// Human-readable origin, used in notifications and logs.
    fn describe(&self) -> String;
}

impl<S: CollectionSource + ?Sized> CollectionSource for &S {
    type Item = S::Item;

    fn load(&self) -> Result<Vec<Self::Item>> {
        (**self).load()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Reads an exported backend list response from a JSON file.
///
/// Accepted payloads:
///
/// - a bare array: `[{..}, {..}]`
/// - an envelope with the array under `items` or `data`:
///   `{ "items": [..], "total": 2 }`
#[derive(Debug, Clone)]
pub struct JsonFileSource<T = Value> {
    path: PathBuf,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T> JsonFileSource<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileSource {
            path: path.into(),
            _marker: std::marker::PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T: DeserializeOwned> CollectionSource for JsonFileSource<T> {
    type Item = T;

    fn load(&self) -> Result<Vec<T>> {
        let origin = self.describe();
        let contents = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        let payload: Value =
            serde_json::from_str(&contents).map_err(|source| SourceError::Json {
                origin: origin.clone(),
                source,
            })?;
        decode_records(payload, &origin)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Unwraps a list response and decodes each record.
pub fn decode_records<T: DeserializeOwned>(payload: Value, origin: &str) -> Result<Vec<T>> {
    let records = match payload {
        Value::Array(records) => records,
        Value::Object(mut envelope) => match ["items", "data"]
            .iter()
            .find_map(|key| envelope.remove(*key))
        {
            Some(Value::Array(records)) => records,
            Some(other) => {
                return Err(SourceError::unexpected_shape(
                    origin,
                    format!("list field holds {}", kind_of(&other)),
                ))
            }
            None => {
                return Err(SourceError::unexpected_shape(
                    origin,
                    "object without an `items` or `data` array",
                ))
            }
        },
        other => {
            return Err(SourceError::unexpected_shape(
                origin,
                format!("expected a list, found {}", kind_of(&other)),
            ))
        }
    };

    records
        .into_iter()
        .map(|record| {
            serde_json::from_value(record).map_err(|source| SourceError::Json {
                origin: origin.to_string(),
                source,
            })
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// In-memory records, handed out as clones on every load.
#[derive(Debug, Clone, Default)]
pub struct StaticSource<T> {
    label: String,
    items: Vec<T>,
}

impl<T> StaticSource<T> {
    pub fn new(label: impl Into<String>, items: Vec<T>) -> Self {
        StaticSource {
            label: label.into(),
            items,
        }
    }
}

impl<T: Clone> CollectionSource for StaticSource<T> {
    type Item = T;

    fn load(&self) -> Result<Vec<T>> {
        Ok(self.items.clone())
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
