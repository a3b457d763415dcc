//! Runtime value types read from records.
//!
//! The [`Value`] enum is what a [`Record`](crate::Record) hands back for a
//! field. It mirrors what a JSON payload can carry at the leaf level: strings
//! (including date-like strings), numbers and booleans, plus [`Value::None`]
//! for anything missing.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ParseError;

/// `YYYY-MM-DD`, optionally followed by a time part introduced by `T` or a space.
static DATE_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}(?:[T ]|$)").expect("date pattern is valid")
});

/// Field value, borrowed from the source record.
///
/// # Example
///
/// ```
/// use tally_query::{Number, Value};
///
/// let status = Value::String("paid");
/// let total = Value::Number(Number::F64(1250.5));
///
/// assert!(status.is_string());
/// assert_eq!(total.to_text(), "1250.5");
/// assert_eq!(Value::None.to_text(), "");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// String value (borrowed). Dates arrive as strings too.
    String(&'a str),
    /// Numeric value.
    Number(Number),
    /// Boolean value.
    Bool(bool),
    /// Field not present, null, or not a scalar.
    None,
}

impl<'a> Value<'a> {
    /// Returns `true` if this is a `None` value.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Returns `true` if this is a `String` value.
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Returns `true` if this is a `Number` value.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// Returns `true` if this is a `Bool` value.
    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns `true` if this is a string shaped like an ISO date.
    pub fn is_date_like(&self) -> bool {
        match self {
            Value::String(s) => is_date_like(s),
            _ => false,
        }
    }

    /// Interprets the value as a point in time.
    ///
    /// Strings are parsed as ISO dates or date-times, numbers are taken as
    /// milliseconds since the Unix epoch. Everything else yields `None`.
    pub fn to_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::String(s) => Timestamp::parse(s),
            Value::Number(n) => {
                let millis = n.to_f64();
                millis.is_finite().then(|| Timestamp(millis as i64))
            }
            _ => None,
        }
    }

    /// Renders the value the way a browser would print it.
    ///
    /// Used for substring search and for the stringified comparison fallback.
    /// `None` renders as the empty string.
    pub fn to_text(&self) -> Cow<'a, str> {
        match self {
            Value::String(s) => Cow::Borrowed(*s),
            Value::Number(n) => Cow::Owned(n.to_string()),
            Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            Value::None => Cow::Borrowed(""),
        }
    }
}

/// Returns `true` if `s` starts with `YYYY-MM-DD` followed by end of string,
/// `T` or a space.
pub fn is_date_like(s: &str) -> bool {
    DATE_LIKE.is_match(s)
}

/// Numeric value supporting all common numeric types.
///
/// Comparisons between different numeric types are handled by converting
/// to the appropriate common type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers, handling mixed types.
    ///
    /// Returns `None` when either side is NaN.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }

    /// Numeric equality across representations (`I64(5) == F64(5.0)`).
    pub fn same_as(self, other: Number) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::I64(n) => write!(f, "{n}"),
            Number::U64(n) => write!(f, "{n}"),
            Number::F64(n) if n.is_nan() => f.write_str("NaN"),
            Number::F64(n) if n.is_infinite() => {
                f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            // Integral floats print without a fractional part, as in `1200`.
            Number::F64(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", n as i64),
            Number::F64(n) => write!(f, "{n}"),
        }
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::I64(n as i64)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::I64(n)
    }
}

impl From<u32> for Number {
    fn from(n: u32) -> Self {
        Number::U64(n as u64)
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        Number::U64(n)
    }
}

impl From<usize> for Number {
    fn from(n: usize) -> Self {
        Number::U64(n as u64)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::F64(n)
    }
}

impl From<&serde_json::Number> for Number {
    fn from(n: &serde_json::Number) -> Self {
        if let Some(i) = n.as_i64() {
            Number::I64(i)
        } else if let Some(u) = n.as_u64() {
            Number::U64(u)
        } else {
            Number::F64(n.as_f64().unwrap_or(f64::NAN))
        }
    }
}

/// A point in time as milliseconds since the Unix epoch (UTC).
///
/// Date strings without an offset are read as UTC, so `2024-01-10` is
/// midnight UTC on that day.
///
/// # Example
///
/// ```
/// use tally_query::Timestamp;
///
/// let day = Timestamp::parse("2024-01-10").unwrap();
/// let later = Timestamp::parse("2024-01-10T08:30:00Z").unwrap();
///
/// assert!(day < later);
/// assert_eq!(later.as_millis() - day.as_millis(), 8 * 3_600_000 + 30 * 60_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creates a new timestamp from milliseconds since Unix epoch.
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Returns the timestamp as milliseconds since Unix epoch.
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Midnight at the start of `date`, read as UTC like date-only strings.
    pub fn start_of(date: NaiveDate) -> Self {
        Timestamp(date.and_time(NaiveTime::MIN).and_utc().timestamp_millis())
    }

    /// Start of the current local calendar day.
    pub fn today() -> Self {
        Timestamp::start_of(Local::now().date_naive())
    }

    /// Parses an ISO 8601 date or date-time.
    ///
    /// Accepted shapes: `2024-01-10`, `2024-01-10T09:15`,
    /// `2024-01-10T09:15:00`, `2024-01-10 09:15:00.123456`, and any of the
    /// date-time forms with a `Z` or `±HH:MM` offset.
    pub fn parse(s: &str) -> Option<Timestamp> {
        let s = s.trim();
        if !is_date_like(s) {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(Timestamp(dt.timestamp_millis()));
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
            if let Ok(dt) = DateTime::parse_from_str(s, format) {
                return Some(Timestamp(dt.timestamp_millis()));
            }
        }
        for format in [
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%d %H:%M",
        ] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
                return Some(Timestamp(dt.and_utc().timestamp_millis()));
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| Timestamp(dt.and_utc().timestamp_millis()))
    }
}

impl From<i64> for Timestamp {
    fn from(millis: i64) -> Self {
        Timestamp(millis)
    }
}

impl FromStr for Timestamp {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timestamp::parse(s).ok_or_else(|| ParseError::InvalidDate(s.to_string()))
    }
}
