//! Field resolution across historical spellings.
//!
//! Backend payloads are not consistent about field names: the same invoice
//! can arrive as `issueDate` from one endpoint and `issue_date` from another.
//! An [`AliasTable`] maps a *logical* field name to the ordered list of
//! *concrete* names to try, and [`AliasTable::resolve`] returns the first
//! value that is actually present.

use std::collections::HashMap;

use convert_case::{Case, Casing};

use crate::record::Record;
use crate::value::Value;

/// Static mapping from logical field names to concrete field names.
///
/// Tables are assembled with the builder methods and then only read. A
/// logical name without an entry resolves to the concrete field of the same
/// name.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use tally_query::{AliasTable, Value};
///
/// let aliases = AliasTable::new().alias("issueDate", ["issueDate", "issue_date"]);
///
/// let camel = json!({ "issueDate": "2024-01-10" });
/// let snake = json!({ "issue_date": "2024-02-01" });
///
/// assert_eq!(aliases.resolve(&camel, "issueDate"), Value::String("2024-01-10"));
/// assert_eq!(aliases.resolve(&snake, "issueDate"), Value::String("2024-02-01"));
/// assert_eq!(aliases.resolve(&snake, "status"), Value::None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: HashMap<String, Vec<String>>,
}

impl AliasTable {
    /// Creates an empty table. Every field resolves to itself.
    pub fn new() -> Self {
        AliasTable::default()
    }

    /// Registers the concrete names tried for `logical`, in priority order.
    ///
    /// Registering the same logical name twice replaces the earlier list.
    pub fn alias<I, S>(mut self, logical: impl Into<String>, concrete: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = Vec::new();
        for name in concrete {
            let name = name.into();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        self.entries.insert(logical.into(), names);
        self
    }

    /// Registers camelCase/snake_case pairs for each field.
    ///
    /// Both spellings become logical names, and each tries its own spelling
    /// first: `issueDate → [issueDate, issue_date]` and
    /// `issue_date → [issue_date, issueDate]`. Single-word fields such as `id`
    /// map to themselves.
    pub fn with_case_variants<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for field in fields {
            let field = field.as_ref();
            let camel = field.to_case(Case::Camel);
            let snake = field.to_case(Case::Snake);
            self = self
                .alias(camel.clone(), [camel.clone(), snake.clone()])
                .alias(snake.clone(), [snake, camel]);
        }
        self
    }

    /// Returns the concrete names tried for `logical`, if it has an entry.
    pub fn candidates(&self, logical: &str) -> Option<&[String]> {
        self.entries.get(logical).map(Vec::as_slice)
    }

    /// Returns the number of logical names with an entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no logical names are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves a logical field on a record.
    ///
    /// Returns the value of the first candidate that is present and not
    /// [`Value::None`], or [`Value::None`] when no candidate is.
    pub fn resolve<'r, R>(&self, record: &'r R, logical: &str) -> Value<'r>
    where
        R: Record + ?Sized,
    {
        match self.entries.get(logical) {
            Some(candidates) => candidates
                .iter()
                .map(|name| record.field(name))
                .find(|value| !value.is_none())
                .unwrap_or(Value::None),
            None => record.field(logical),
        }
    }
}
