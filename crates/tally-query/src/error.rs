//! Error types for turning user-facing text into query specs.
//!
//! Running a query never fails; only parsing does.

use thiserror::Error;

/// Errors that can occur when parsing query inputs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A date bound that is not an ISO date or date-time.
    #[error("invalid date '{0}'")]
    InvalidDate(String),

    /// A sort key with nothing before the direction suffix.
    #[error("sort key is missing a field name")]
    EmptySortField,

    /// A sort direction other than `asc` or `desc`.
    #[error("invalid sort direction '{direction}' for field '{field}' (expected asc or desc)")]
    InvalidSortDirection { field: String, direction: String },
}

/// Result type for parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;
