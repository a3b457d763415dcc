//! The [`Record`] trait: concrete field access for anything the pipeline queries.

use std::collections::{BTreeMap, HashMap};

use serde_json::Map;

use crate::value::{Number, Value};

/// Trait for types the pipeline can filter and sort.
///
/// A record only answers for *concrete* field names. Logical names and their
/// historical spellings are handled one level up by the
/// [`AliasTable`](crate::AliasTable).
///
/// JSON objects implement this out of the box, which covers backend
/// responses decoded with `serde_json`:
///
/// ```
/// use serde_json::json;
/// use tally_query::{Record, Value};
///
/// let invoice = json!({ "status": "paid", "issue_date": "2024-01-10", "notes": null });
///
/// assert_eq!(invoice.field("status"), Value::String("paid"));
/// assert_eq!(invoice.field("notes"), Value::None);
/// assert_eq!(invoice.field("missing"), Value::None);
/// ```
///
/// # Manual Implementation
///
/// ```
/// use tally_query::{Number, Record, Value};
///
/// struct Task {
///     title: String,
///     hours: u32,
/// }
///
/// impl Record for Task {
///     fn field(&self, name: &str) -> Value<'_> {
///         match name {
///             "title" => Value::String(&self.title),
///             "hours" => Value::Number(Number::U64(self.hours as u64)),
///             _ => Value::None,
///         }
///     }
/// }
/// ```
pub trait Record {
    /// Returns the value stored under a concrete field name.
    ///
    /// Missing, null and non-scalar fields return [`Value::None`].
    fn field(&self, name: &str) -> Value<'_>;
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, name: &str) -> Value<'_> {
        (**self).field(name)
    }
}

impl Record for serde_json::Value {
    fn field(&self, name: &str) -> Value<'_> {
        match self {
            serde_json::Value::Object(map) => map.field(name),
            _ => Value::None,
        }
    }
}

impl Record for Map<String, serde_json::Value> {
    fn field(&self, name: &str) -> Value<'_> {
        self.get(name).map(json_scalar).unwrap_or(Value::None)
    }
}

impl Record for HashMap<String, String> {
    fn field(&self, name: &str) -> Value<'_> {
        self.get(name)
            .map(|s| Value::String(s))
            .unwrap_or(Value::None)
    }
}

impl Record for BTreeMap<String, String> {
    fn field(&self, name: &str) -> Value<'_> {
        self.get(name)
            .map(|s| Value::String(s))
            .unwrap_or(Value::None)
    }
}

fn json_scalar(value: &serde_json::Value) -> Value<'_> {
    match value {
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Number(n) => Value::Number(Number::from(n)),
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            Value::None
        }
    }
}
