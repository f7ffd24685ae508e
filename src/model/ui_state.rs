//! UI-only table state: selection and expansion. Never sent to a fetcher.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Key of a row, as used for selection and expansion.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(String);

impl RowId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RowId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for RowId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

/// Which detail panel an expanded row shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpansionKind(String);

impl ExpansionKind {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ExpansionKind {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ExpansionKind {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiOnlyState {
    pub expanded_rows: BTreeMap<RowId, ExpansionKind>,
    pub selected_rows: BTreeSet<RowId>,
}

impl UiOnlyState {
    /// Expands `row` with `kind`. Toggling the same kind again collapses the row;
    /// a different kind replaces the current one.
    pub fn toggle_expanded(&mut self, row: RowId, kind: ExpansionKind) {
        if self.expanded_rows.get(&row) == Some(&kind) {
            self.expanded_rows.remove(&row);
        } else {
            self.expanded_rows.insert(row, kind);
        }
    }

    pub fn toggle_selected(&mut self, row: RowId) {
        if !self.selected_rows.remove(&row) {
            self.selected_rows.insert(row);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected_rows.clear();
    }

    pub fn is_selected(&self, row: &RowId) -> bool {
        self.selected_rows.contains(row)
    }

    pub fn expansion(&self, row: &RowId) -> Option<&ExpansionKind> {
        self.expanded_rows.get(row)
    }
}
