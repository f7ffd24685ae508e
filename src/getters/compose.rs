//! Fluent composition of decorators.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use table_dataflow::framework::{fetch_fn, WithCount};
//! use table_dataflow::getters::{BaseFetcher, DataGetterExt, ReferenceSet};
//! use table_dataflow::model::TableDataParams;
//!
//! let todos = WithCount::new(fetch_fn(|_: TableDataParams| async {
//!     Ok::<_, String>(vec![(1u32, "buy milk".to_string())])
//! }));
//! let getter = BaseFetcher::new(todos)
//!     .resolve_references(ReferenceSet::<String>::new(), |data, _refs| data.clone())
//!     .paginate_locally(|row: &(u32, String), phrase: &str| row.1.contains(phrase), None)
//!     .poll(Duration::from_secs(30));
//! # let _ = getter;
//! ```

use std::cmp::Ordering;
use std::time::Duration;

use super::client_side::{ClientSidePaginator, Filtering};
use super::polling::Poller;
use super::references::{RefResolver, ReferenceSet, ReferencesMap};
use crate::framework::DataGetter;
use crate::model::TableDataWithCount;

/// Sort comparator accepted by [`DataGetterExt::paginate_locally`].
pub type Comparator<R> = Box<dyn Fn(&R, &R) -> Ordering + Send + Sync>;

pub trait DataGetterExt: DataGetter + Sized {
    /// See [`ClientSidePaginator`].
    fn paginate_locally<R>(
        self,
        filter: impl Fn(&R, &str) -> bool + Send + Sync + 'static,
        sort: Option<Comparator<R>>,
    ) -> ClientSidePaginator<Self, R>
    where
        Self: DataGetter<Data = TableDataWithCount<R>>,
        R: Clone + Send + Sync + 'static,
    {
        let paginator = ClientSidePaginator::new(self).with_filter(filter);
        match sort {
            Some(sort) => paginator.with_sort(sort),
            None => paginator,
        }
    }

    /// See [`Filtering`].
    fn filtered<R>(
        self,
        filter: impl Fn(&R, &str) -> bool + Send + Sync + 'static,
    ) -> Filtering<Self, R>
    where
        Self: DataGetter<Data = TableDataWithCount<R>>,
        R: Clone + Send + Sync + 'static,
    {
        Filtering::new(self, filter)
    }

    /// See [`RefResolver`].
    fn resolve_references<V, R>(
        self,
        references: ReferenceSet<V>,
        resolve: impl Fn(&Self::Data, &ReferencesMap<V>) -> R + Send + Sync + 'static,
    ) -> RefResolver<Self, V, R>
    where
        V: Clone + Send + Sync + 'static,
        R: Clone + Send + Sync + 'static,
    {
        RefResolver::new(self, references, resolve)
    }

    /// See [`Poller`].
    fn poll(self, interval: Duration) -> Poller<Self> {
        Poller::new(self, interval)
    }
}

impl<G: DataGetter> DataGetterExt for G {}
