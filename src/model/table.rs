//! Row containers produced by fetchers.

use serde::{Deserialize, Serialize};

/// An unpaginated result: the rows in source order plus how many there are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDataWithCount<R> {
    pub rows: Vec<R>,
    pub total_count: usize,
}

impl<R> TableDataWithCount<R> {
    pub fn new(rows: Vec<R>) -> Self {
        let total_count = rows.len();
        Self { rows, total_count }
    }
}

impl<R> From<Vec<R>> for TableDataWithCount<R> {
    fn from(rows: Vec<R>) -> Self {
        Self::new(rows)
    }
}

/// Data shapes whose visible row count the state composer can inspect.
pub trait Rows {
    fn row_count(&self) -> usize;
}

impl<R> Rows for TableDataWithCount<R> {
    fn row_count(&self) -> usize {
        self.rows.len()
    }
}

impl<R> Rows for Vec<R> {
    fn row_count(&self) -> usize {
        self.len()
    }
}
