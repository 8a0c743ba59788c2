use crate::service::{ApplicationStatus, Record};
use serde::{Deserialize, Serialize};

mod columns;
mod sort;

pub use columns::{ColumnConfig, ColumnSet};
pub use sort::{SortDirection, SortState, cell_text, compare_values, sort_records};

/// The column the status filter looks at.
pub const STATUS_COLUMN: &str = "Status";

/// Everything the applications table is currently asked to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableQuery {
    pub search: String,
    pub status_filter: Option<ApplicationStatus>,
    pub sort: Option<SortState>,
    /// 1-indexed.
    pub page: usize,
    pub page_size: usize,
}

impl Default for TableQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            status_filter: None,
            sort: None,
            page: 1,
            page_size: 10,
        }
    }
}

impl TableQuery {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    /// Header click on `key`.
    pub fn toggle_sort(&mut self, key: &str) {
        self.sort = Some(SortState::toggle(self.sort.as_ref(), key));
    }
}

/// One page of the table and the numbers the pager needs.
#[derive(Debug, Clone, PartialEq)]
pub struct TablePage {
    pub rows: Vec<Record>,
    /// Rows left after filtering, across all pages.
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
}

/// Keeps the rows that match the search term and the status filter.
///
/// The search is a case-insensitive substring test against every cell's text;
/// the status filter compares the `Status` cell exactly.
pub fn filter(records: &[Record], search: &str, status: Option<ApplicationStatus>) -> Vec<Record> {
    let needle = search.to_lowercase();
    records
        .iter()
        .filter(|record| {
            needle.is_empty()
                || record
                    .values()
                    .any(|v| cell_text(v).to_lowercase().contains(&needle))
        })
        .filter(|record| match status {
            None => true,
            Some(status) => record
                .get(STATUS_COLUMN)
                .and_then(|v| v.as_str())
                .is_some_and(|s| s == status.as_str()),
        })
        .cloned()
        .collect()
}

pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1))
}

/// Rows of the 1-indexed `page`. Page 0 counts as page 1; pages past the end are empty.
pub fn paginate(records: &[Record], page: usize, page_size: usize) -> Vec<Record> {
    let page_size = page_size.max(1);
    let start = (page.max(1) - 1).saturating_mul(page_size);
    records
        .iter()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect()
}

/// The filter, sort and paginate pipeline.
pub struct TableView;

impl TableView {
    pub fn apply(records: &[Record], query: &TableQuery) -> TablePage {
        let mut rows = filter(records, &query.search, query.status_filter);
        if let Some(sort) = &query.sort {
            sort_records(&mut rows, sort);
        }
        let total = rows.len();
        let page = query.page.max(1);
        TablePage {
            rows: paginate(&rows, page, query.page_size),
            total,
            page,
            page_count: page_count(total, query.page_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(name: &str, status: &str) -> Record {
        match json!({ "Full Name": name, "Status": status, "City": "Berlin" }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn search_is_case_insensitive_over_all_cells() {
        let records = vec![record("John Doe", "pending"), record("Jane Smith", "approved")];
        assert_eq!(filter(&records, "jOHN", None).len(), 1);
        assert_eq!(filter(&records, "berlin", None).len(), 2);
        assert_eq!(filter(&records, "", None).len(), 2);
        assert_eq!(filter(&records, "", Some(ApplicationStatus::Approved)).len(), 1);
        assert!(filter(&records, "john", Some(ApplicationStatus::Approved)).is_empty());
    }

    #[test]
    fn page_zero_and_out_of_range() {
        let records: Vec<_> = (0..3).map(|i| record(&i.to_string(), "pending")).collect();
        assert_eq!(paginate(&records, 0, 2).len(), 2);
        assert_eq!(paginate(&records, 2, 2).len(), 1);
        assert!(paginate(&records, 3, 2).is_empty());
        assert_eq!(page_count(3, 2), 2);
        assert_eq!(page_count(0, 10), 0);
    }

    #[test]
    fn apply_reports_totals() {
        let records: Vec<_> = (0..25).map(|i| record(&format!("n{}", i), "pending")).collect();
        let query = TableQuery {
            page: 3,
            ..TableQuery::default()
        };
        let page = TableView::apply(&records, &query);
        assert_eq!(page.rows.len(), 5);
        assert_eq!(page.total, 25);
        assert_eq!(page.page_count, 3);
    }
}
