//! Fetchers and decorators.
//!
//! Every type here implements [`DataGetter`](crate::framework::DataGetter). A pipeline
//! starts with a [`BaseFetcher`] and is wrapped by zero or more decorators, usually via
//! [`DataGetterExt`].
//!
//! - [`BaseFetcher`] - One request per refresh, switch-to-latest
//! - [`RefResolver`] - Joins named auxiliary sources into the result
//! - [`ClientSidePaginator`] / [`Filtering`] - Local filter, sort and page window
//! - [`Poller`] - Re-fetches a fixed delay after every response

pub mod base;
pub mod client_side;
pub mod compose;
pub mod polling;
pub mod references;

pub use base::BaseFetcher;
pub use client_side::{ClientSidePaginator, FilterFn, Filtering, SortFn};
pub use compose::{Comparator, DataGetterExt};
pub use polling::Poller;
pub use references::{
    source_fn, RefResolver, Reference, ReferenceSet, ReferenceSource, ReferencesMap, SourceFn,
};
