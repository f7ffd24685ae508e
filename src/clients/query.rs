//! Mapping of parameter snapshots to query strings.

use crate::model::TableDataParams;

/// Maps [`TableDataParams`] to query pairs for a JSON-server style backend.
///
/// - `searching` adds `<field>_like=<phrase>` unless the phrase is empty.
/// - `pagination` adds `_page=<page>&_limit=<page_size>`.
///
/// With both switches off the whole collection is requested, which is what
/// client-side pagination wants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMapper {
    pagination: bool,
    searching: bool,
    search_field: String,
}

impl QueryMapper {
    pub fn new(pagination: bool, searching: bool) -> Self {
        Self {
            pagination,
            searching,
            search_field: "title".to_string(),
        }
    }

    /// Requests the whole collection.
    pub fn unpaginated() -> Self {
        Self::new(false, false)
    }

    pub fn search_field(mut self, field: impl Into<String>) -> Self {
        self.search_field = field.into();
        self
    }

    pub fn pairs(&self, params: &TableDataParams) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if self.searching && !params.search_phrase.is_empty() {
            pairs.push((format!("{}_like", self.search_field), params.search_phrase.clone()));
        }
        if self.pagination {
            pairs.push(("_page".to_string(), params.page.to_string()));
            pairs.push(("_limit".to_string(), params.page_size.to_string()));
        }
        pairs
    }
}

impl Default for QueryMapper {
    fn default() -> Self {
        Self::new(true, true)
    }
}
