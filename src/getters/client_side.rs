//! # Client-Side View
//!
//! Decorators for fetches that return the *entire* dataset at once.
//!
//! [`ClientSidePaginator`] filters, sorts and page-windows the fetched rows;
//! [`Filtering`] only filters. Both derive their view from rows that were already
//! fetched: search phrase, page and page size changes never reach the network.
//! Filtering and sorting rerun when the rows or the search phrase change, while a
//! page or page size change only moves the window over the cached selection.
//!
//! The output `total_count` is the number of rows that passed the filter, i.e. the
//! size of the set the page window is drawn from.

use std::cmp::Ordering;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, trace};

use crate::framework::{DataGetter, Feed, FetchState};
use crate::model::{TableDataParams, TableDataWithCount};

/// Decides whether `row` matches `search_phrase`.
pub type FilterFn<R> = dyn Fn(&R, &str) -> bool + Send + Sync;
/// Orders two rows.
pub type SortFn<R> = dyn Fn(&R, &R) -> Ordering + Send + Sync;

type State<R, E> = FetchState<TableDataWithCount<R>, E>;

// =============================================================================
// 1. THE DECORATORS
// =============================================================================

/// Filters, sorts and paginates a full dataset locally.
///
/// Without a filter every row matches; without a sort the source order is kept.
/// The wrapped getter only sees a new parameter snapshot when the request id changes,
/// so it fetches once per refresh.
pub struct ClientSidePaginator<G, R> {
    inner: G,
    view: View<R>,
}

impl<G, R> ClientSidePaginator<G, R>
where
    G: DataGetter<Data = TableDataWithCount<R>>,
    R: Clone + Send + Sync + 'static,
{
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            view: View {
                filter: None,
                sort: None,
                paginate: true,
            },
        }
    }

    pub fn with_filter(
        mut self,
        filter: impl Fn(&R, &str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.view.filter = Some(Arc::new(filter));
        self
    }

    pub fn with_sort(mut self, sort: impl Fn(&R, &R) -> Ordering + Send + Sync + 'static) -> Self {
        self.view.sort = Some(Arc::new(sort));
        self
    }
}

impl<G, R> DataGetter for ClientSidePaginator<G, R>
where
    G: DataGetter<Data = TableDataWithCount<R>>,
    R: Clone + Send + Sync + 'static,
{
    type Data = TableDataWithCount<R>;
    type Error = G::Error;

    fn get(&self, params: Feed<TableDataParams>) -> Feed<State<R, G::Error>> {
        let main = self.inner.get(params.clone().distinct_by(|p| p.request_id));
        let (sender, feed) = Feed::channel(FetchState::pending());
        tokio::spawn(self.view.clone().run(main, params, sender));
        feed
    }
}

/// Filters a full dataset locally by the search phrase. Rows are neither sorted nor
/// paged, and the wrapped getter sees every parameter snapshot.
pub struct Filtering<G, R> {
    inner: G,
    view: View<R>,
}

impl<G, R> Filtering<G, R>
where
    G: DataGetter<Data = TableDataWithCount<R>>,
    R: Clone + Send + Sync + 'static,
{
    pub fn new(inner: G, filter: impl Fn(&R, &str) -> bool + Send + Sync + 'static) -> Self {
        Self {
            inner,
            view: View {
                filter: Some(Arc::new(filter)),
                sort: None,
                paginate: false,
            },
        }
    }
}

impl<G, R> DataGetter for Filtering<G, R>
where
    G: DataGetter<Data = TableDataWithCount<R>>,
    R: Clone + Send + Sync + 'static,
{
    type Data = TableDataWithCount<R>;
    type Error = G::Error;

    fn get(&self, params: Feed<TableDataParams>) -> Feed<State<R, G::Error>> {
        let main = self.inner.get(params.clone());
        let (sender, feed) = Feed::channel(FetchState::pending());
        tokio::spawn(self.view.clone().run(main, params, sender));
        feed
    }
}

// =============================================================================
// 2. THE VIEW TASK
// =============================================================================

struct View<R> {
    filter: Option<Arc<FilterFn<R>>>,
    sort: Option<Arc<SortFn<R>>>,
    paginate: bool,
}

impl<R> Clone for View<R> {
    fn clone(&self) -> Self {
        Self {
            filter: self.filter.clone(),
            sort: self.sort.clone(),
            paginate: self.paginate,
        }
    }
}

impl<R> View<R>
where
    R: Clone + Send + Sync + 'static,
{
    /// Filtered and sorted rows of the current result, `None` unless it succeeded.
    fn select<E>(&self, state: &State<R, E>, search_phrase: &str) -> Option<Vec<R>> {
        let data = state.data()?;
        let mut selected: Vec<R> = match &self.filter {
            Some(filter) => data
                .rows
                .iter()
                .filter(|row| filter(row, search_phrase))
                .cloned()
                .collect(),
            None => data.rows.clone(),
        };
        if let Some(sort) = &self.sort {
            selected.sort_by(|a, b| sort(a, b));
        }
        debug!(
            fetched = data.rows.len(),
            selected = selected.len(),
            search_phrase,
            "Rows filtered"
        );
        Some(selected)
    }

    fn window(&self, selected: &[R], params: &TableDataParams) -> TableDataWithCount<R> {
        let rows = if self.paginate {
            let start = params.offset().min(selected.len());
            let end = start.saturating_add(params.page_size).min(selected.len());
            trace!(start, end, page = params.page, "Page window");
            selected[start..end].to_vec()
        } else {
            selected.to_vec()
        };
        TableDataWithCount {
            rows,
            total_count: selected.len(),
        }
    }

    fn output<E: Clone>(
        &self,
        state: &State<R, E>,
        selected: Option<&[R]>,
        params: &TableDataParams,
    ) -> State<R, E> {
        match selected {
            Some(rows) => FetchState {
                loading: state.loading,
                result: Some(Ok(self.window(rows, params))),
            },
            None => state.clone(),
        }
    }

    async fn run<E: Clone + Send + Sync + 'static>(
        self,
        mut main: Feed<State<R, E>>,
        mut params: Feed<TableDataParams>,
        sender: watch::Sender<State<R, E>>,
    ) {
        let mut current = params.latest();
        let mut state = main.latest();
        let mut selected = self.select(&state, &current.search_phrase);
        if sender
            .send(self.output(&state, selected.as_deref(), &current))
            .is_err()
        {
            return;
        }

        loop {
            tokio::select! {
                changed = main.changed() => {
                    let Some(next) = changed else { break };
                    state = next;
                    selected = self.select(&state, &current.search_phrase);
                }
                changed = params.changed() => {
                    let Some(next) = changed else { break };
                    let phrase_changed = next.search_phrase != current.search_phrase;
                    let window_changed =
                        next.page != current.page || next.page_size != current.page_size;
                    current = next;
                    if phrase_changed {
                        selected = self.select(&state, &current.search_phrase);
                    } else if !(self.paginate && window_changed) {
                        continue;
                    }
                }
                _ = sender.closed() => break,
            }

            if sender
                .send(self.output(&state, selected.as_deref(), &current))
                .is_err()
            {
                break;
            }
        }

        trace!("Client-side view stopped");
    }
}
