//! The query pipeline: filter, then sort, then paginate.
//!
//! [`Pipeline`] binds an [`AliasTable`] and runs [`FilterSpec`],
//! [`SortSpec`] and [`PageSpec`] against a slice of records. Nothing here
//! can fail: an empty collection, a filter that matches nothing and a page
//! past the end all produce a well-formed [`QueryResult`].

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::alias::AliasTable;
use crate::filter::FilterSpec;
use crate::ordering::SortSpec;
use crate::record::Record;

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Which page to return, and how big pages are.
///
/// `page_index` is zero-based. A page size of zero is clamped to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageSpec {
    pub page_index: usize,
    pub page_size: NonZeroUsize,
}

impl PageSpec {
    /// Creates a page spec, clamping a zero `page_size` to 1.
    pub fn new(page_index: usize, page_size: usize) -> Self {
        PageSpec {
            page_index,
            page_size: NonZeroUsize::new(page_size).unwrap_or(NonZeroUsize::MIN),
        }
    }

    /// The first page with the given size.
    pub fn first(page_size: usize) -> Self {
        PageSpec::new(0, page_size)
    }

    /// Same page size, different page.
    pub fn at(self, page_index: usize) -> Self {
        PageSpec { page_index, ..self }
    }

    /// Index of the first item on this page.
    pub fn offset(&self) -> usize {
        self.page_index.saturating_mul(self.page_size.get())
    }

    /// Number of pages needed for `total` items. Zero when `total` is zero.
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size.get())
    }
}

impl Default for PageSpec {
    fn default() -> Self {
        PageSpec::first(DEFAULT_PAGE_SIZE)
    }
}

/// One page of results plus the totals needed to render pagination.
///
/// Items borrow from the collection the query ran against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult<'a, R> {
    /// Records on the requested page, in sorted order.
    pub items: Vec<&'a R>,
    /// Number of records that passed the filter, across all pages.
    pub total_matched: usize,
    /// `ceil(total_matched / page_size)`.
    pub page_count: usize,
    /// The page these items were taken from.
    pub page_index: usize,
}

impl<'a, R> QueryResult<'a, R> {
    /// Returns `true` if this page has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `true` if a later page exists.
    pub fn has_next_page(&self) -> bool {
        self.page_index + 1 < self.page_count
    }

    /// Returns `true` if an earlier page exists.
    pub fn has_previous_page(&self) -> bool {
        self.page_index > 0 && self.page_count > 0
    }
}

/// Runs list queries with a fixed alias table.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use tally_query::{AliasTable, FilterSpec, PageSpec, Pipeline, SortSpec};
///
/// let invoices = vec![
///     json!({ "id": 1, "status": "paid", "issueDate": "2024-01-10" }),
///     json!({ "id": 2, "status": "draft", "issue_date": "2024-01-11" }),
///     json!({ "id": 3, "status": "paid", "issue_date": "2024-02-01" }),
/// ];
///
/// let pipeline = Pipeline::new(AliasTable::new().with_case_variants(["issueDate"]));
/// let result = pipeline.execute(
///     &invoices,
///     &FilterSpec::new().status("status", "paid"),
///     &SortSpec::new().desc("issueDate"),
///     PageSpec::first(10),
/// );
///
/// assert_eq!(result.total_matched, 2);
/// assert_eq!(result.page_count, 1);
/// assert_eq!(result.items[0]["id"], 3);
/// assert_eq!(result.items[1]["id"], 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    aliases: AliasTable,
}

impl Pipeline {
    pub fn new(aliases: AliasTable) -> Self {
        Pipeline { aliases }
    }

    /// The alias table used to resolve field names.
    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Tests a single record against a filter.
    pub fn matches<R>(&self, record: &R, filter: &FilterSpec) -> bool
    where
        R: Record + ?Sized,
    {
        filter.matches(record, &self.aliases)
    }

    /// Records that pass the filter, in input order.
    pub fn matching<'a, R>(&self, items: &'a [R], filter: &FilterSpec) -> Vec<&'a R>
    where
        R: Record,
    {
        items
            .iter()
            .filter(|item| filter.matches(*item, &self.aliases))
            .collect()
    }

    /// Number of records that pass the filter.
    pub fn count<R>(&self, items: &[R], filter: &FilterSpec) -> usize
    where
        R: Record,
    {
        items
            .iter()
            .filter(|item| filter.matches(*item, &self.aliases))
            .count()
    }

    /// Filters, sorts and paginates `items`.
    ///
    /// The sort is stable: records that tie on every key keep their input
    /// order.
    pub fn execute<'a, R>(
        &self,
        items: &'a [R],
        filter: &FilterSpec,
        sort: &SortSpec,
        page: PageSpec,
    ) -> QueryResult<'a, R>
    where
        R: Record,
    {
        let mut matched = self.matching(items, filter);

        sort.sort(&mut matched, &self.aliases);

        let total_matched = matched.len();
        let items = matched
            .into_iter()
            .skip(page.offset())
            .take(page.page_size.get())
            .collect();

        QueryResult {
            items,
            total_matched,
            page_count: page.page_count(total_matched),
            page_index: page.page_index,
        }
    }
}

/// Runs a query without field aliasing.
///
/// Shorthand for `Pipeline::default().execute(..)`.
pub fn execute<'a, R>(
    items: &'a [R],
    filter: &FilterSpec,
    sort: &SortSpec,
    page: PageSpec,
) -> QueryResult<'a, R>
where
    R: Record,
{
    Pipeline::default().execute(items, filter, sort, page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value as Json};

    fn numbered(n: usize) -> Vec<Json> {
        (0..n).map(|i| json!({ "id": i })).collect()
    }

    fn ids(result: &QueryResult<'_, Json>) -> Vec<i64> {
        result
            .items
            .iter()
            .map(|item| item["id"].as_i64().unwrap())
            .collect()
    }

    #[test]
    fn page_spec_clamps_zero_size() {
        let page = PageSpec::new(2, 0);
        assert_eq!(page.page_size.get(), 1);
        assert_eq!(page.offset(), 2);
    }

    #[test]
    fn page_spec_defaults() {
        let page = PageSpec::default();
        assert_eq!(page.page_index, 0);
        assert_eq!(page.page_size.get(), DEFAULT_PAGE_SIZE);
        assert_eq!(page.at(3).offset(), 30);
    }

    #[test]
    fn page_count_rounds_up() {
        let page = PageSpec::first(10);
        assert_eq!(page.page_count(0), 0);
        assert_eq!(page.page_count(1), 1);
        assert_eq!(page.page_count(10), 1);
        assert_eq!(page.page_count(11), 2);
    }

    #[test]
    fn huge_page_index_does_not_overflow() {
        let items = numbered(3);
        let result = execute(
            &items,
            &FilterSpec::new(),
            &SortSpec::new(),
            PageSpec::new(usize::MAX, 10),
        );
        assert!(result.is_empty());
        assert_eq!(result.total_matched, 3);
    }

    #[test]
    fn pages_slice_the_matched_records() {
        let items = numbered(25);
        let filter = FilterSpec::new();
        let sort = SortSpec::new();

        let first = execute(&items, &filter, &sort, PageSpec::first(10));
        assert_eq!(ids(&first), (0..10).collect::<Vec<_>>());
        assert_eq!(first.page_count, 3);
        assert!(first.has_next_page());
        assert!(!first.has_previous_page());

        let last = execute(&items, &filter, &sort, PageSpec::new(2, 10));
        assert_eq!(ids(&last), (20..25).collect::<Vec<_>>());
        assert!(!last.has_next_page());
        assert!(last.has_previous_page());
    }

    #[test]
    fn out_of_range_page_is_empty() {
        let items = numbered(5);
        let result = execute(
            &items,
            &FilterSpec::new(),
            &SortSpec::new(),
            PageSpec::new(4, 10),
        );
        assert!(result.items.is_empty());
        assert_eq!(result.total_matched, 5);
        assert_eq!(result.page_count, 1);
        assert_eq!(result.page_index, 4);
    }

    #[test]
    fn empty_collection() {
        let items: Vec<Json> = Vec::new();
        let result = execute(
            &items,
            &FilterSpec::new().search(["name"], "acme"),
            &SortSpec::new().asc("name"),
            PageSpec::default(),
        );
        assert!(result.items.is_empty());
        assert_eq!(result.total_matched, 0);
        assert_eq!(result.page_count, 0);
    }

    #[test]
    fn sort_is_stable() {
        let items = vec![
            json!({ "id": 0, "status": "paid" }),
            json!({ "id": 1, "status": "draft" }),
            json!({ "id": 2, "status": "paid" }),
            json!({ "id": 3, "status": "draft" }),
        ];
        let result = execute(
            &items,
            &FilterSpec::new(),
            &SortSpec::new().asc("status"),
            PageSpec::default(),
        );
        assert_eq!(ids(&result), vec![1, 3, 0, 2]);
    }

    #[test]
    fn count_and_matching_ignore_pages() {
        let items = vec![
            json!({ "id": 0, "status": "paid" }),
            json!({ "id": 1, "status": "draft" }),
            json!({ "id": 2, "status": "paid" }),
        ];
        let pipeline = Pipeline::default();
        let filter = FilterSpec::new().status("status", "paid");

        assert_eq!(pipeline.count(&items, &filter), 2);
        let matched: Vec<i64> = pipeline
            .matching(&items, &filter)
            .iter()
            .map(|item| item["id"].as_i64().unwrap())
            .collect();
        assert_eq!(matched, vec![0, 2]);
        assert!(pipeline.matches(&items[0], &filter));
        assert!(!pipeline.matches(&items[1], &filter));
    }

    #[test]
    fn result_serializes_with_totals() {
        let items = numbered(3);
        let result = execute(
            &items,
            &FilterSpec::new(),
            &SortSpec::new(),
            PageSpec::first(2),
        );
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "items": [{ "id": 0 }, { "id": 1 }],
                "total_matched": 3,
                "page_count": 2,
                "page_index": 0,
            })
        );
    }
}
