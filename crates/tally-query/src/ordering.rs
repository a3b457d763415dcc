//! Sort keys and the comparator.
//!
//! Values are compared with type-aware rules, applied in order:
//!
//! 1. Equal values (including two missing ones) compare `Equal`.
//! 2. A missing value sorts after a present one, in *both* directions.
//! 3. Two ISO-date-like strings compare by the instant they denote.
//! 4. Two strings compare with [`locale_compare`].
//! 5. Two numbers compare numerically (NaN compares `Equal`).
//! 6. Anything else compares by its printed form with [`locale_compare`].
//!
//! A descending key reverses rules 3–6 only, so missing values stay pinned
//! to the end.
//!
//! Those rules are not transitive across kinds: `9 < 10` as numbers,
//! `10 < "9"` as text, and `"9" == 9` as text. [`SortSpec::sort`] therefore
//! does not apply them pair by pair. It ranks every value of a key on one scale for the
//! whole list instead:
//!
//! - every present value a number: numerically, NaN after all other numbers
//! - every present value a parseable date-like string: by instant
//! - anything else: by printed form with [`locale_compare`]
//!
//! A key whose values mix kinds is therefore ordered entirely as text.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use deunicode::deunicode;
use serde::{Deserialize, Serialize};

use crate::alias::AliasTable;
use crate::error::ParseError;
use crate::record::Record;
use crate::value::{Number, Timestamp, Value};

/// One sort key: a logical field and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    /// The logical field to sort by.
    pub field: String,
    /// `true` for largest/latest first.
    #[serde(default)]
    pub descending: bool,
}

impl SortKey {
    /// Creates a new ascending key for the given field.
    pub fn asc(field: impl Into<String>) -> Self {
        SortKey {
            field: field.into(),
            descending: false,
        }
    }

    /// Creates a new descending key for the given field.
    pub fn desc(field: impl Into<String>) -> Self {
        SortKey {
            field: field.into(),
            descending: true,
        }
    }

    /// Creates a new key with the given direction.
    pub fn new(field: impl Into<String>, descending: bool) -> Self {
        SortKey {
            field: field.into(),
            descending,
        }
    }

    /// Compares two records on this key.
    pub fn compare<R>(&self, a: &R, b: &R, aliases: &AliasTable) -> Ordering
    where
        R: Record + ?Sized,
    {
        compare(a, b, &self.field, self.descending, aliases)
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = if self.descending { "desc" } else { "asc" };
        write!(f, "{}:{}", self.field, dir)
    }
}

/// Parses `field`, `field:asc` or `field:desc`.
///
/// ```
/// use tally_query::SortKey;
///
/// let key: SortKey = "issueDate:desc".parse().unwrap();
/// assert_eq!(key, SortKey::desc("issueDate"));
/// assert_eq!("name".parse::<SortKey>().unwrap(), SortKey::asc("name"));
/// ```
impl FromStr for SortKey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.rsplit_once(':') {
            Some((field, direction)) => (field.trim(), Some(direction.trim())),
            None => (s.trim(), None),
        };
        if field.is_empty() {
            return Err(ParseError::EmptySortField);
        }
        let descending = match direction.map(str::to_ascii_lowercase).as_deref() {
            None | Some("asc") => false,
            Some("desc") => true,
            Some(other) => {
                return Err(ParseError::InvalidSortDirection {
                    field: field.to_string(),
                    direction: other.to_string(),
                })
            }
        };
        Ok(SortKey::new(field, descending))
    }
}

/// An ordered list of sort keys. The first key is primary.
///
/// An empty spec leaves records in their input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    /// Creates an empty spec.
    pub fn new() -> Self {
        SortSpec::default()
    }

    /// Appends an ascending key.
    pub fn asc(self, field: impl Into<String>) -> Self {
        self.then(SortKey::asc(field))
    }

    /// Appends a descending key.
    pub fn desc(self, field: impl Into<String>) -> Self {
        self.then(SortKey::desc(field))
    }

    /// Appends a key as the next tie-breaker.
    pub fn then(mut self, key: SortKey) -> Self {
        self.keys.push(key);
        self
    }

    /// Returns the keys in priority order.
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Returns `true` if there are no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Compares two records key by key, returning the first non-`Equal` result.
    pub fn compare<R>(&self, a: &R, b: &R, aliases: &AliasTable) -> Ordering
    where
        R: Record + ?Sized,
    {
        self.keys
            .iter()
            .map(|key| key.compare(a, b, aliases))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }

    /// Stably sorts `records` by these keys.
    ///
    /// Each key is read once per record and ranked on a single scale for the
    /// list (see the module docs), so the order is total for any mix of
    /// values. Records that tie on every key keep their input order.
    pub fn sort<'a, R>(&self, records: &mut Vec<&'a R>, aliases: &AliasTable)
    where
        R: Record + ?Sized,
    {
        if self.keys.is_empty() || records.len() < 2 {
            return;
        }

        let columns: Vec<Vec<SortCell<'a>>> = self
            .keys
            .iter()
            .map(|key| SortCell::column(records.as_slice(), &key.field, aliases))
            .collect();

        let mut order: Vec<usize> = (0..records.len()).collect();
        order.sort_by(|&i, &j| {
            self.keys
                .iter()
                .zip(&columns)
                .map(|(key, cells)| cells[i].compare(&cells[j], key.descending))
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        let sorted: Vec<&'a R> = order.into_iter().map(|i| records[i]).collect();
        *records = sorted;
    }
}

impl From<Vec<SortKey>> for SortSpec {
    fn from(keys: Vec<SortKey>) -> Self {
        SortSpec { keys }
    }
}

impl FromIterator<SortKey> for SortSpec {
    fn from_iter<I: IntoIterator<Item = SortKey>>(iter: I) -> Self {
        SortSpec {
            keys: iter.into_iter().collect(),
        }
    }
}

/// Compares two records on one logical field.
///
/// Missing values are pinned last regardless of `descending`.
pub fn compare<R>(a: &R, b: &R, field: &str, descending: bool, aliases: &AliasTable) -> Ordering
where
    R: Record + ?Sized,
{
    let left = aliases.resolve(a, field);
    let right = aliases.resolve(b, field);

    match (&left, &right) {
        (Value::None, Value::None) => Ordering::Equal,
        (Value::None, _) => Ordering::Greater,
        (_, Value::None) => Ordering::Less,
        _ => {
            let ordering = compare_values(&left, &right);
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        }
    }
}

/// Ascending comparison of two present values (rules 3–6).
///
/// `Value::None` is treated like any other value here, printing as `""`;
/// callers that need pinning go through [`compare`].
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Ordering {
    match (a, b) {
        (Value::String(x), Value::String(y)) => {
            if let (Some(tx), Some(ty)) = (date_of(x), date_of(y)) {
                return tx.cmp(&ty);
            }
            locale_compare(x, y)
        }
        (Value::Number(x), Value::Number(y)) => x.compare(*y).unwrap_or(Ordering::Equal),
        _ => locale_compare(&a.to_text(), &b.to_text()),
    }
}

/// How one key's values are ranked across a whole list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scale {
    Integer,
    Float,
    Instant,
    Text,
}

impl Scale {
    fn of(values: &[Value<'_>]) -> Scale {
        let present: Vec<&Value<'_>> = values.iter().filter(|value| !value.is_none()).collect();

        if present
            .iter()
            .all(|value| matches!(value, Value::Number(Number::I64(_) | Number::U64(_))))
        {
            Scale::Integer
        } else if present.iter().all(|value| value.is_number()) {
            Scale::Float
        } else if present
            .iter()
            .all(|value| value.as_str().and_then(date_of).is_some())
        {
            Scale::Instant
        } else {
            Scale::Text
        }
    }
}

/// One record's value for one sort key, ranked on its column's [`Scale`].
#[derive(Debug)]
enum SortCell<'a> {
    Missing,
    Integer(i128),
    Float(f64),
    Instant(i64),
    Text { folded: String, raw: Cow<'a, str> },
}

impl<'a> SortCell<'a> {
    fn column<R>(records: &[&'a R], field: &str, aliases: &AliasTable) -> Vec<SortCell<'a>>
    where
        R: Record + ?Sized,
    {
        let values: Vec<Value<'a>> = records
            .iter()
            .map(|record| aliases.resolve(*record, field))
            .collect();
        let scale = Scale::of(&values);
        values
            .into_iter()
            .map(|value| SortCell::ranked(value, scale))
            .collect()
    }

    fn ranked(value: Value<'a>, scale: Scale) -> SortCell<'a> {
        let ranked = match (scale, &value) {
            (_, Value::None) => return SortCell::Missing,
            (Scale::Integer, Value::Number(Number::I64(n))) => Some(SortCell::Integer((*n).into())),
            (Scale::Integer, Value::Number(Number::U64(n))) => Some(SortCell::Integer((*n).into())),
            (Scale::Float, Value::Number(n)) => Some(SortCell::Float(n.to_f64())),
            (Scale::Instant, Value::String(s)) => {
                date_of(s).map(|instant| SortCell::Instant(instant.as_millis()))
            }
            _ => None,
        };
        ranked.unwrap_or_else(|| {
            let raw = value.to_text();
            SortCell::Text {
                folded: collation_key(&raw),
                raw,
            }
        })
    }

    fn rank(&self) -> u8 {
        match self {
            SortCell::Integer(_) => 0,
            SortCell::Float(_) => 1,
            SortCell::Instant(_) => 2,
            SortCell::Text { .. } => 3,
            SortCell::Missing => 4,
        }
    }

    fn compare(&self, other: &SortCell<'_>, descending: bool) -> Ordering {
        let ordering = match (self, other) {
            (SortCell::Missing, SortCell::Missing) => return Ordering::Equal,
            (SortCell::Missing, _) => return Ordering::Greater,
            (_, SortCell::Missing) => return Ordering::Less,
            (SortCell::Integer(a), SortCell::Integer(b)) => a.cmp(b),
            (SortCell::Float(a), SortCell::Float(b)) => compare_floats(*a, *b),
            (SortCell::Instant(a), SortCell::Instant(b)) => a.cmp(b),
            (
                SortCell::Text { folded: a, raw: ra },
                SortCell::Text { folded: b, raw: rb },
            ) => a.cmp(b).then_with(|| ra.cmp(rb)),
            // Cells of one column share a scale; this only keeps the match total.
            _ => self.rank().cmp(&other.rank()),
        };
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// NaN ranks after every other number and ties with itself.
fn compare_floats(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn date_of(s: &str) -> Option<Timestamp> {
    if crate::value::is_date_like(s) {
        Timestamp::parse(s)
    } else {
        None
    }
}

/// Language-friendly string ordering.
///
/// Strings are compared on their transliterated, lower-cased forms so that
/// case and accents do not split otherwise adjacent words (`"apple"`,
/// `"Banana"`, `"Élan"`, `"zebra"`). Ties fall back to the raw strings to
/// keep the order total.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

fn collation_key(s: &str) -> String {
    deunicode(s).to_lowercase()
}
