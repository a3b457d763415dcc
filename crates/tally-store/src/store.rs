//! The collection store: one loaded collection plus its notifications.

use serde::Serialize;
use tally_query::{Pipeline, QueryResult, Record};
use tracing::{debug, warn};

use crate::message::Notification;
use crate::source::CollectionSource;
use crate::state::ListState;

/// Pending notifications kept per store; older ones are dropped first.
pub const MAX_NOTIFICATIONS: usize = 16;

/// What a call to [`CollectionStore::refresh`] left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "count", rename_all = "lowercase")]
pub enum RefreshOutcome {
    /// The source answered; this many records are now held.
    Loaded(usize),
    /// The source failed; this many previously loaded records are kept.
    Stale(usize),
    /// The source failed before anything was ever loaded.
    Empty,
}

/// Holds the last successfully loaded collection.
///
/// A failed refresh never clears data that was already shown: it keeps the
/// previous records, pushes an error [`Notification`] and reports
/// [`RefreshOutcome::Stale`] (or [`RefreshOutcome::Empty`] on a first load).
/// A stale refresh also pushes a warning saying how many cached records are
/// still shown.
///
/// Notifications wait until the caller drains them with
/// [`take_notifications`](Self::take_notifications). At most
/// [`MAX_NOTIFICATIONS`] are kept.
#[derive(Debug, Clone)]
pub struct CollectionStore<R> {
    label: String,
    items: Vec<R>,
    loaded: bool,
    notifications: Vec<Notification>,
}

impl<R> CollectionStore<R> {
    /// Creates an empty store. `label` names the collection in notifications.
    pub fn new(label: impl Into<String>) -> Self {
        CollectionStore {
            label: label.into(),
            items: Vec::new(),
            loaded: false,
            notifications: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    /// Returns `true` once a refresh has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    fn notify(&mut self, notification: Notification) {
        if self.notifications.len() == MAX_NOTIFICATIONS {
            self.notifications.remove(0);
        }
        self.notifications.push(notification);
    }

    /// Drains pending notifications.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Reloads the collection from `source`. One attempt, no retry.
    pub fn refresh<S>(&mut self, source: &S) -> RefreshOutcome
    where
        S: CollectionSource<Item = R> + ?Sized,
    {
        let origin = source.describe();
        match source.load() {
            Ok(items) => {
                debug!(collection = %self.label, origin = %origin, count = items.len(), "loaded collection");
                self.items = items;
                self.loaded = true;
                RefreshOutcome::Loaded(self.items.len())
            }
            Err(err) => {
                warn!(collection = %self.label, origin = %origin, error = %err, "failed to load collection");
                self.notify(Notification::error(format!(
                    "Failed to load {}: {}",
                    self.label, err
                )));
                if !self.loaded {
                    return RefreshOutcome::Empty;
                }
                self.notify(Notification::warning(format!(
                    "Showing {} cached {}",
                    self.items.len(),
                    self.label
                )));
                RefreshOutcome::Stale(self.items.len())
            }
        }
    }
}

impl<R: Record> CollectionStore<R> {
    /// Runs the list state's query over the held records.
    pub fn query<'a>(&'a self, pipeline: &Pipeline, state: &ListState) -> QueryResult<'a, R> {
        pipeline.execute(&self.items, &state.filter, &state.sort, state.page)
    }
}
