//! Tally Store - list screens over backend collections.
//!
//! This crate sits between a data source and the
//! [`tally_query`] pipeline:
//!
//! - [`EntityKind`] is the catalog of list screens: the status, search,
//!   date-range and default-sort fields of invoices, projects, tasks,
//!   employees and customers, plus the aliases their payloads need.
//! - [`CollectionSource`] loads a whole collection ([`JsonFileSource`],
//!   [`StaticSource`]).
//! - [`CollectionStore`] keeps the last good load and turns failures into
//!   [`Notification`]s instead of errors.
//! - [`ListState`] is the caller's filter/sort/page, with the usual
//!   "filter change goes back to page one" behaviour.
//!
//! ```
//! use serde_json::json;
//! use tally_query::Pipeline;
//! use tally_store::{CollectionStore, EntityKind, RefreshOutcome, StaticSource};
//!
//! let source = StaticSource::new("fixtures", vec![
//!     json!({ "invoice_number": "INV-1", "status": "paid", "issue_date": "2024-01-10" }),
//!     json!({ "invoiceNumber": "INV-2", "status": "sent", "issueDate": "2024-02-01" }),
//! ]);
//!
//! let entity = EntityKind::Invoice;
//! let mut store = CollectionStore::new(entity.plural());
//! assert_eq!(store.refresh(&source), RefreshOutcome::Loaded(2));
//!
//! let mut state = entity.list_state(10);
//! state.set_search(entity.search_fields().iter().copied(), "inv-2");
//!
//! let page = store.query(&Pipeline::new(entity.aliases()), &state);
//! assert_eq!(page.total_matched, 1);
//! ```

mod entity;
mod error;
mod message;
mod source;
mod state;
mod store;

pub use entity::{EntityKind, InvalidStatus, UnknownEntity};
pub use error::{Result, SourceError};
pub use message::{Notification, NotificationLevel};
pub use source::{decode_records, CollectionSource, JsonFileSource, StaticSource};
pub use state::ListState;
pub use store::{CollectionStore, RefreshOutcome, MAX_NOTIFICATIONS};
