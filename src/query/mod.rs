//! Query parameters and their canonical form.
//!
//! The UI keeps loose, user-edited parameters (`QueryParams`). Before anything
//! reaches the pager they are normalized into a `QueryKey`, the value that
//! scopes every cursor. Two keys compare equal only when every field is equal,
//! and any difference invalidates the cursors gathered under the old key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use unicase::UniCase;

use crate::error::{PagewiseError, Result};

pub mod debounce;

pub use debounce::{DebounceInput, DebouncedOutput, Debouncer};

/// Filter value meaning "no restriction on this field".
pub const ALL_SENTINEL: &str = "all";

/// Sort direction applied by the data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggle(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

enum_display_fromstr!(
    SortOrder,
    PagewiseError::InvalidSortOrder,
    {
        Asc => "asc",
        Desc => "desc",
    }
);

/// Canonical identity of a search/filter/sort/page-size combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QueryKey {
    search: String,
    filters: BTreeMap<String, String>,
    order: SortOrder,
    page_size: usize,
}

impl QueryKey {
    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    pub fn filter(&self, field: &str) -> Option<&str> {
        self.filters.get(field).map(String::as_str)
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Compare two keys field by field.
    pub fn diff(&self, other: &QueryKey) -> KeyChange {
        let mut fields = Vec::new();
        if self.search != other.search {
            fields.push(KeyField::Search);
        }
        if self.filters != other.filters {
            fields.push(KeyField::Filters);
        }
        if self.order != other.order {
            fields.push(KeyField::Order);
        }
        if self.page_size != other.page_size {
            fields.push(KeyField::PageSize);
        }

        if fields.is_empty() {
            KeyChange::Unchanged
        } else {
            KeyChange::Changed(fields)
        }
    }
}

/// A field of the query key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyField {
    Search,
    Filters,
    Order,
    PageSize,
}

enum_display!(
    KeyField,
    {
        Search => "search",
        Filters => "filters",
        Order => "order",
        PageSize => "page size",
    }
);

/// Result of comparing a new key against the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyChange {
    Unchanged,
    /// Every field that differs. Any change means the session must reset.
    Changed(Vec<KeyField>),
}

impl KeyChange {
    pub fn requires_reset(&self) -> bool {
        matches!(self, KeyChange::Changed(_))
    }
}

/// Raw, user-edited query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
    #[serde(default)]
    pub order: SortOrder,
    pub page_size: usize,
}

impl QueryParams {
    pub fn new(page_size: usize) -> Self {
        Self {
            search: String::new(),
            filters: BTreeMap::new(),
            order: SortOrder::default(),
            page_size,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Clear search, filters and ordering. The page size is kept.
    pub fn reset_filters(&mut self) {
        self.search.clear();
        self.filters.clear();
        self.order = SortOrder::default();
    }

    /// Produce the canonical key for these parameters.
    pub fn normalize(&self) -> Result<QueryKey> {
        if self.page_size == 0 {
            return Err(PagewiseError::InvalidPageSize(self.page_size));
        }

        let search = collapse_whitespace(&self.search);

        let mut filters = BTreeMap::new();
        for (field, value) in &self.filters {
            let field = field.trim();
            if field.is_empty() {
                return Err(PagewiseError::InvalidFilter(format!(
                    "empty field name for value '{value}'"
                )));
            }
            let value = value.trim();
            if is_unrestricted(value) {
                continue;
            }
            filters.insert(field.to_string(), value.to_string());
        }

        Ok(QueryKey {
            search,
            filters,
            order: self.order,
            page_size: self.page_size,
        })
    }
}

/// True for filter values that place no restriction on a field.
pub fn is_unrestricted(value: &str) -> bool {
    value.is_empty() || UniCase::new(value) == UniCase::new(ALL_SENTINEL)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_collapses_search() {
        let key = QueryParams::new(10)
            .with_search("  acme   cloud \t labs ")
            .normalize()
            .unwrap();
        assert_eq!(key.search(), "acme cloud labs");
    }

    #[test]
    fn test_normalize_drops_all_sentinel_and_empty_filters() {
        let key = QueryParams::new(10)
            .with_filter("industry", "All")
            .with_filter("tier", "  ")
            .with_filter(" region ", " EU ")
            .normalize()
            .unwrap();
        assert_eq!(key.filters().len(), 1);
        assert_eq!(key.filter("region"), Some("EU"));
        assert_eq!(key.filter("industry"), None);
    }

    #[test]
    fn test_normalize_rejects_zero_page_size() {
        let err = QueryParams::new(0).normalize().unwrap_err();
        assert!(matches!(err, PagewiseError::InvalidPageSize(0)));
    }

    #[test]
    fn test_normalize_rejects_empty_field_name() {
        let err = QueryParams::new(10)
            .with_filter("  ", "Finance")
            .normalize()
            .unwrap_err();
        assert!(matches!(err, PagewiseError::InvalidFilter(_)));
    }

    #[test]
    fn test_equivalent_params_produce_equal_keys() {
        let a = QueryParams::new(10).with_search("acme").normalize().unwrap();
        let b = QueryParams::new(10)
            .with_search(" acme ")
            .with_filter("industry", "all")
            .normalize()
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.diff(&b), KeyChange::Unchanged);
        assert!(!a.diff(&b).requires_reset());
    }

    #[test]
    fn test_diff_lists_every_changed_field() {
        let a = QueryParams::new(10).normalize().unwrap();
        let b = QueryParams::new(20)
            .with_filter("industry", "Finance")
            .with_order(SortOrder::Desc)
            .normalize()
            .unwrap();
        assert_eq!(
            a.diff(&b),
            KeyChange::Changed(vec![KeyField::Filters, KeyField::Order, KeyField::PageSize])
        );
    }

    #[test]
    fn test_page_size_change_requires_reset() {
        let a = QueryParams::new(10).normalize().unwrap();
        let b = QueryParams::new(50).normalize().unwrap();
        assert!(a.diff(&b).requires_reset());
    }

    #[test]
    fn test_reset_filters_keeps_page_size() {
        let mut params = QueryParams::new(20)
            .with_search("x")
            .with_filter("industry", "Finance")
            .with_order(SortOrder::Desc);
        params.reset_filters();
        assert_eq!(params, QueryParams::new(20));
    }

    #[test]
    fn test_sort_order_toggle_and_parse() {
        assert_eq!(SortOrder::Asc.toggle(), SortOrder::Desc);
        assert_eq!(SortOrder::Desc.toggle(), SortOrder::Asc);
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert_eq!(SortOrder::Asc.to_string(), "asc");
        assert!("up".parse::<SortOrder>().is_err());
    }
}
