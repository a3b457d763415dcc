//! Filter criteria and the predicate engine.
//!
//! A [`FilterSpec`] carries three independent predicates plus any number of
//! extra [`Condition`]s. A record passes when all of them pass:
//!
//! ```text
//! match = status(record) ∧ search(record) ∧ range(record) ∧ conditions(record)
//! ```
//!
//! Each predicate is disabled by its neutral input, so
//! `FilterSpec::default()` matches everything:
//!
//! - **Status**: no field/value, or the value [`ALL_STATUSES`]
//! - **Search**: a query that is empty after trimming
//! - **Range**: neither bound set
//! - **Conditions**: an empty list

use crate::alias::AliasTable;
use crate::record::Record;
use crate::value::{Number, Timestamp, Value};

/// Status value that disables the status predicate.
pub const ALL_STATUSES: &str = "all";

/// Owned value a status field is compared against.
///
/// Unlike [`Value`], which borrows from the record, `StatusValue` owns its
/// data so it can live in caller state between queries.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusValue {
    /// String status, e.g. `"paid"` or `"In Progress"`.
    String(String),
    /// Numeric status code.
    Number(Number),
    /// Boolean flag, e.g. `isActive`.
    Bool(bool),
}

impl StatusValue {
    /// Returns `true` for the `"all"` sentinel.
    pub fn is_all(&self) -> bool {
        matches!(self, StatusValue::String(s) if s == ALL_STATUSES)
    }

    /// Strict equality against a resolved field value.
    ///
    /// Kinds must agree: the string `"1"` does not equal the number `1`.
    pub fn matches(&self, value: &Value<'_>) -> bool {
        match (self, value) {
            (StatusValue::String(expected), Value::String(actual)) => expected == actual,
            (StatusValue::Number(expected), Value::Number(actual)) => expected.same_as(*actual),
            (StatusValue::Bool(expected), Value::Bool(actual)) => expected == actual,
            _ => false,
        }
    }
}

impl From<String> for StatusValue {
    fn from(s: String) -> Self {
        StatusValue::String(s)
    }
}

impl From<&str> for StatusValue {
    fn from(s: &str) -> Self {
        StatusValue::String(s.to_string())
    }
}

impl From<bool> for StatusValue {
    fn from(b: bool) -> Self {
        StatusValue::Bool(b)
    }
}

impl From<i64> for StatusValue {
    fn from(n: i64) -> Self {
        StatusValue::Number(Number::I64(n))
    }
}

impl From<Number> for StatusValue {
    fn from(n: Number) -> Self {
        StatusValue::Number(n)
    }
}

/// An extra predicate on one field, for scoping a list (one project's
/// invoices) or building a fixed view (overdue tasks).
///
/// A missing field never satisfies a condition, including `NotEquals`.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Strict equality, with the same kind rules as the status predicate.
    Equals { field: String, value: StatusValue },
    /// Present and not strictly equal.
    NotEquals { field: String, value: StatusValue },
    /// A date strictly earlier than `instant`.
    Before { field: String, instant: Timestamp },
}

impl Condition {
    pub fn equals(field: impl Into<String>, value: impl Into<StatusValue>) -> Self {
        Condition::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn not_equals(field: impl Into<String>, value: impl Into<StatusValue>) -> Self {
        Condition::NotEquals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn before(field: impl Into<String>, instant: Timestamp) -> Self {
        Condition::Before {
            field: field.into(),
            instant,
        }
    }

    /// Tests one record.
    pub fn matches<R>(&self, record: &R, aliases: &AliasTable) -> bool
    where
        R: Record + ?Sized,
    {
        match self {
            Condition::Equals { field, value } => value.matches(&aliases.resolve(record, field)),
            Condition::NotEquals { field, value } => {
                let actual = aliases.resolve(record, field);
                !actual.is_none() && !value.matches(&actual)
            }
            Condition::Before { field, instant } => aliases
                .resolve(record, field)
                .to_timestamp()
                .is_some_and(|at| at < *instant),
        }
    }
}

/// Filter criteria for one query.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use tally_query::{AliasTable, FilterSpec, Timestamp};
///
/// let invoice = json!({
///     "status": "paid",
///     "customer_name": "Acme Corp",
///     "issue_date": "2024-01-10",
/// });
/// let aliases = AliasTable::new().with_case_variants(["customerName", "issueDate"]);
///
/// let filter = FilterSpec::new()
///     .status("status", "paid")
///     .search(["customerName", "invoiceNumber"], "acme")
///     .range("issueDate", Timestamp::parse("2024-01-01"), Timestamp::parse("2024-01-31"));
///
/// assert!(filter.matches(&invoice, &aliases));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    /// Logical field the status predicate reads.
    pub status_field: Option<String>,
    /// Expected status; [`ALL_STATUSES`] disables the predicate.
    pub status_value: Option<StatusValue>,
    /// Logical fields searched by `search_query`.
    pub search_fields: Vec<String>,
    /// Case-insensitive substring to look for.
    pub search_query: Option<String>,
    /// Logical field holding the date the range applies to.
    pub range_field: Option<String>,
    /// Inclusive lower bound.
    pub range_from: Option<Timestamp>,
    /// Inclusive upper bound.
    pub range_to: Option<Timestamp>,
    /// Extra predicates, all of which must hold.
    pub conditions: Vec<Condition>,
}

impl FilterSpec {
    /// Creates a filter that matches every record.
    pub fn new() -> Self {
        FilterSpec::default()
    }

    /// Sets the status predicate.
    pub fn status(mut self, field: impl Into<String>, value: impl Into<StatusValue>) -> Self {
        self.status_field = Some(field.into());
        self.status_value = Some(value.into());
        self
    }

    /// Sets the search fields and query.
    pub fn search<I, S>(mut self, fields: I, query: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self.search_query = Some(query.into());
        self
    }

    /// Sets the range predicate. Either bound may be `None`.
    pub fn range(
        mut self,
        field: impl Into<String>,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> Self {
        self.range_field = Some(field.into());
        self.range_from = from;
        self.range_to = to;
        self
    }

    /// Adds an extra predicate.
    pub fn with(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Returns `true` if the status predicate is active.
    pub fn has_status(&self) -> bool {
        self.status_field.is_some() && self.status_value.as_ref().is_some_and(|v| !v.is_all())
    }

    /// Returns the trimmed search query when search is active.
    pub fn active_search(&self) -> Option<&str> {
        self.search_query
            .as_deref()
            .map(str::trim)
            .filter(|query| !query.is_empty())
    }

    /// Returns `true` if at least one range bound is set.
    pub fn has_range(&self) -> bool {
        self.range_from.is_some() || self.range_to.is_some()
    }

    /// Returns `true` if this filter cannot exclude anything.
    pub fn is_neutral(&self) -> bool {
        !self.has_status()
            && self.active_search().is_none()
            && !self.has_range()
            && self.conditions.is_empty()
    }

    /// Tests a record against every predicate.
    pub fn matches<R>(&self, record: &R, aliases: &AliasTable) -> bool
    where
        R: Record + ?Sized,
    {
        self.status_passes(record, aliases)
            && self.search_passes(record, aliases)
            && self.range_passes(record, aliases)
            && self
                .conditions
                .iter()
                .all(|condition| condition.matches(record, aliases))
    }

    fn status_passes<R: Record + ?Sized>(&self, record: &R, aliases: &AliasTable) -> bool {
        match (&self.status_field, &self.status_value) {
            (Some(field), Some(expected)) if !expected.is_all() => {
                expected.matches(&aliases.resolve(record, field))
            }
            _ => true,
        }
    }

    fn search_passes<R: Record + ?Sized>(&self, record: &R, aliases: &AliasTable) -> bool {
        let Some(query) = self.active_search() else {
            return true;
        };
        let needle = query.to_lowercase();
        self.search_fields.iter().any(|field| {
            aliases
                .resolve(record, field)
                .to_text()
                .to_lowercase()
                .contains(&needle)
        })
    }

    fn range_passes<R: Record + ?Sized>(&self, record: &R, aliases: &AliasTable) -> bool {
        if !self.has_range() {
            return true;
        }
        let resolved = match &self.range_field {
            Some(field) => aliases.resolve(record, field).to_timestamp(),
            None => None,
        };
        let Some(at) = resolved else {
            return false;
        };
        self.range_from.map_or(true, |from| at >= from) && self.range_to.map_or(true, |to| at <= to)
    }
}
