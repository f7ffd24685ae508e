//! Query parameters shared by every stage of a table pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque refresh token. A change of request id is the only signal that makes the
/// pipeline issue a new fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// A fresh id, never equal to any id handed out before.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Parameter snapshot: what page to show, how big pages are, what the user searched
/// for, and which refresh produced the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDataParams {
    pub page_size: usize,
    pub page: usize,
    pub search_phrase: String,
    pub request_id: RequestId,
}

impl TableDataParams {
    pub fn new(page_size: usize, page: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            page: page.max(1),
            search_phrase: String::new(),
            request_id: RequestId::new(),
        }
    }

    /// Index of the first row on the current page.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

impl Default for TableDataParams {
    fn default() -> Self {
        Self::new(15, 1)
    }
}

/// Shallow partial update of [`TableDataParams`]. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamsPatch {
    pub page_size: Option<usize>,
    pub page: Option<usize>,
    pub search_phrase: Option<String>,
    pub request_id: Option<RequestId>,
}

impl ParamsPatch {
    pub fn page(page: usize) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }

    pub fn page_size(page_size: usize) -> Self {
        Self {
            page_size: Some(page_size),
            ..Self::default()
        }
    }

    pub fn search_phrase(phrase: impl Into<String>) -> Self {
        Self {
            search_phrase: Some(phrase.into()),
            ..Self::default()
        }
    }

    pub fn refresh() -> Self {
        Self {
            request_id: Some(RequestId::new()),
            ..Self::default()
        }
    }

    /// Merges the set fields into `params`. Page and page size never drop below 1.
    pub fn apply(self, params: &mut TableDataParams) {
        if let Some(page_size) = self.page_size {
            params.page_size = page_size.max(1);
        }
        if let Some(page) = self.page {
            params.page = page.max(1);
        }
        if let Some(search_phrase) = self.search_phrase {
            params.search_phrase = search_phrase;
        }
        if let Some(request_id) = self.request_id {
            params.request_id = request_id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_are_unique() {
        let ids: std::collections::HashSet<_> = (0..100).map(|_| RequestId::new()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn patch_only_touches_set_fields() {
        let mut params = TableDataParams::new(10, 2);
        let request_id = params.request_id;

        ParamsPatch::search_phrase("milk").apply(&mut params);

        assert_eq!(params.page, 2);
        assert_eq!(params.page_size, 10);
        assert_eq!(params.search_phrase, "milk");
        assert_eq!(params.request_id, request_id);
    }

    #[test]
    fn patch_clamps_page_and_page_size() {
        let mut params = TableDataParams::default();
        ParamsPatch {
            page: Some(0),
            page_size: Some(0),
            ..ParamsPatch::default()
        }
        .apply(&mut params);

        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 1);
    }

    #[test]
    fn offset_follows_page_window() {
        let mut params = TableDataParams::new(10, 3);
        assert_eq!(params.offset(), 20);
        params.page = 1;
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn params_serialize_in_camel_case() {
        let params = TableDataParams::new(5, 1);
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["pageSize"], 5);
        assert_eq!(json["searchPhrase"], "");
    }
}
