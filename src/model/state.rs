//! The composed table snapshot observed by the presentation layer.

use std::collections::{BTreeMap, BTreeSet};

use super::{ExpansionKind, RowId, TableDataParams, UiOnlyState};
use crate::framework::FetchState;

/// One consistent view of a table: parameters, fetch state and UI-only state.
///
/// Each part keeps its own type so it is always clear where a field comes from.
/// Only the state composer builds these.
#[derive(Debug, Clone, PartialEq)]
pub struct TableState<D, E> {
    pub params: TableDataParams,
    pub fetch: FetchState<D, E>,
    pub ui: UiOnlyState,
}

impl<D, E> TableState<D, E> {
    pub fn loading(&self) -> bool {
        self.fetch.loading
    }

    pub fn result(&self) -> Option<&Result<D, E>> {
        self.fetch.result.as_ref()
    }

    pub fn data(&self) -> Option<&D> {
        self.fetch.data()
    }

    pub fn error(&self) -> Option<&E> {
        self.fetch.error()
    }

    pub fn page(&self) -> usize {
        self.params.page
    }

    pub fn page_size(&self) -> usize {
        self.params.page_size
    }

    pub fn search_phrase(&self) -> &str {
        &self.params.search_phrase
    }

    pub fn expanded_rows(&self) -> &BTreeMap<RowId, ExpansionKind> {
        &self.ui.expanded_rows
    }

    pub fn selected_rows(&self) -> &BTreeSet<RowId> {
        &self.ui.selected_rows
    }
}
