//! Tally Query - filter, sort and paginate in-memory record collections.
//!
//! List screens all do the same three things to a collection fetched from
//! the backend: keep the records that match a status, a free-text search
//! and a date range; order them by one or more keys; and cut out one page.
//! This crate does those three things once, over any type implementing
//! [`Record`], with an [`AliasTable`] to paper over payloads that spell the
//! same field as `issueDate` in one place and `issue_date` in another.
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use tally_query::{AliasTable, FilterSpec, PageSpec, Pipeline, SortSpec, Timestamp};
//!
//! let invoices = vec![
//!     json!({ "invoiceNumber": "INV-001", "status": "paid", "issueDate": "2024-01-10", "total": 1200 }),
//!     json!({ "invoice_number": "INV-002", "status": "overdue", "issue_date": "2024-01-20", "total": 80 }),
//!     json!({ "invoice_number": "INV-003", "status": "paid", "issue_date": "2024-02-05", "total": 430 }),
//! ];
//!
//! let pipeline = Pipeline::new(
//!     AliasTable::new().with_case_variants(["invoiceNumber", "issueDate"]),
//! );
//!
//! let filter = FilterSpec::new()
//!     .status("status", "paid")
//!     .search(["invoiceNumber"], "inv")
//!     .range("issueDate", Some("2024-01-01".parse::<Timestamp>()?), None);
//! let sort = SortSpec::new().desc("issueDate");
//!
//! let page = pipeline.execute(&invoices, &filter, &sort, PageSpec::first(10));
//!
//! assert_eq!(page.total_matched, 2);
//! assert_eq!(page.items[0]["invoice_number"], "INV-003");
//! assert_eq!(page.items[1]["invoiceNumber"], "INV-001");
//! # Ok::<(), tally_query::ParseError>(())
//! ```
//!
//! # Filter Semantics
//!
//! A record passes when all three predicates pass:
//!
//! ```text
//! match = status(record) ∧ search(record) ∧ range(record)
//! ```
//!
//! - **Status**: strict equality against the status value; `"all"` disables it.
//! - **Search**: case-insensitive substring over the search fields; an empty
//!   or whitespace-only query disables it.
//! - **Range**: inclusive bounds on a date field; a record without a
//!   parseable date fails once any bound is set.
//!
//! # Ordering
//!
//! See [`compare`] for the comparison rules. Missing values always sort
//! last, whichever direction a key runs in.

mod alias;
mod error;
mod filter;
mod ordering;
mod query;
mod record;
mod value;

pub use alias::AliasTable;
pub use error::{ParseError, Result};
pub use filter::{Condition, FilterSpec, StatusValue, ALL_STATUSES};
pub use ordering::{compare, compare_values, locale_compare, SortKey, SortSpec};
pub use query::{execute, PageSpec, Pipeline, QueryResult, DEFAULT_PAGE_SIZE};
pub use record::Record;
pub use value::{is_date_like, Number, Timestamp, Value};
