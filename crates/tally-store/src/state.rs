//! Caller-owned list view state.

use tally_query::{Condition, FilterSpec, PageSpec, SortKey, SortSpec, StatusValue, Timestamp};

/// The filter, sort and page a list view is showing.
///
/// Any change to what is being listed (status, search, date range or sort)
/// jumps back to the first page, since the old page index no longer points
/// at the same records. Changing the page size does the same.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListState {
    pub filter: FilterSpec,
    pub sort: SortSpec,
    pub page: PageSpec,
}

impl ListState {
    /// A neutral state on the first page.
    pub fn new(page_size: usize) -> Self {
        ListState {
            filter: FilterSpec::new(),
            sort: SortSpec::new(),
            page: PageSpec::first(page_size),
        }
    }

    /// Replaces the sort and returns the state, for setup chains.
    pub fn sorted_by(mut self, sort: SortSpec) -> Self {
        self.set_sort(sort);
        self
    }

    pub fn page_index(&self) -> usize {
        self.page.page_index
    }

    pub fn set_status(&mut self, field: impl Into<String>, value: impl Into<StatusValue>) {
        self.filter.status_field = Some(field.into());
        self.filter.status_value = Some(value.into());
        self.reset_page();
    }

    pub fn clear_status(&mut self) {
        self.filter.status_field = None;
        self.filter.status_value = None;
        self.reset_page();
    }

    pub fn set_search<I, S>(&mut self, fields: I, query: impl Into<String>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter.search_fields = fields.into_iter().map(Into::into).collect();
        self.filter.search_query = Some(query.into());
        self.reset_page();
    }

    pub fn set_range(
        &mut self,
        field: impl Into<String>,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) {
        self.filter.range_field = Some(field.into());
        self.filter.range_from = from;
        self.filter.range_to = to;
        self.reset_page();
    }

    /// Adds a scoping condition on top of the other filters.
    pub fn require(&mut self, condition: Condition) {
        self.filter.conditions.push(condition);
        self.reset_page();
    }

    /// Replaces the whole filter.
    pub fn set_filter(&mut self, filter: FilterSpec) {
        self.filter = filter;
        self.reset_page();
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
        self.reset_page();
    }

    /// Makes `key` the primary sort key, keeping the others as tie-breakers.
    ///
    /// This is what clicking a column header does.
    pub fn sort_by(&mut self, key: SortKey) {
        let rest = self
            .sort
            .keys()
            .iter()
            .filter(|existing| existing.field != key.field)
            .cloned()
            .collect::<Vec<_>>();
        self.sort = std::iter::once(key).chain(rest).collect();
        self.reset_page();
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page = PageSpec::first(page_size);
    }

    pub fn set_page(&mut self, page_index: usize) {
        self.page = self.page.at(page_index);
    }

    pub fn next_page(&mut self) {
        self.page = self.page.at(self.page.page_index.saturating_add(1));
    }

    pub fn previous_page(&mut self) {
        self.page = self.page.at(self.page.page_index.saturating_sub(1));
    }

    /// Pulls a stale page index back into `0..page_count`.
    ///
    /// With no pages at all the index becomes 0.
    pub fn clamp_page(&mut self, page_count: usize) {
        let last = page_count.saturating_sub(1);
        if self.page.page_index > last {
            self.page = self.page.at(last);
        }
    }

    fn reset_page(&mut self) {
        self.page = self.page.at(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_page(index: usize) -> ListState {
        let mut state = ListState::new(10);
        state.set_page(index);
        state
    }

    #[test]
    fn test_filter_changes_reset_page() {
        let mut state = on_page(3);
        state.set_status("status", "paid");
        assert_eq!(state.page_index(), 0);

        let mut state = on_page(3);
        state.set_search(["customerName"], "acme");
        assert_eq!(state.page_index(), 0);

        let mut state = on_page(3);
        state.set_range("issueDate", Timestamp::parse("2024-01-01"), None);
        assert_eq!(state.page_index(), 0);

        let mut state = on_page(3);
        state.clear_status();
        assert_eq!(state.page_index(), 0);

        let mut state = on_page(3);
        state.set_filter(FilterSpec::new());
        assert_eq!(state.page_index(), 0);

        let mut state = on_page(3);
        state.require(Condition::equals("projectId", "p-1"));
        assert_eq!(state.page_index(), 0);
        assert_eq!(state.filter.conditions.len(), 1);
    }

    #[test]
    fn test_sort_changes_reset_page() {
        let mut state = on_page(2);
        state.set_sort(SortSpec::new().desc("total"));
        assert_eq!(state.page_index(), 0);

        let mut state = on_page(2);
        state.sort_by(SortKey::asc("name"));
        assert_eq!(state.page_index(), 0);
    }

    #[test]
    fn test_sort_by_promotes_key() {
        let mut state = ListState::new(10).sorted_by(SortSpec::new().desc("issueDate").asc("id"));
        state.sort_by(SortKey::asc("id"));
        assert_eq!(state.sort, SortSpec::new().asc("id").desc("issueDate"));
    }

    #[test]
    fn test_page_size_change_resets_page() {
        let mut state = on_page(4);
        state.set_page_size(25);
        assert_eq!(state.page_index(), 0);
        assert_eq!(state.page.page_size.get(), 25);
    }

    #[test]
    fn test_page_navigation_saturates() {
        let mut state = ListState::new(10);
        state.previous_page();
        assert_eq!(state.page_index(), 0);
        state.next_page();
        state.next_page();
        assert_eq!(state.page_index(), 2);
        state.previous_page();
        assert_eq!(state.page_index(), 1);
    }

    #[test]
    fn test_clamp_page() {
        let mut state = on_page(5);
        state.clamp_page(3);
        assert_eq!(state.page_index(), 2);

        state.clamp_page(10);
        assert_eq!(state.page_index(), 2);

        state.clamp_page(0);
        assert_eq!(state.page_index(), 0);
    }
}
