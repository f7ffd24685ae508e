//! # Core Dataflow Contracts
//!
//! This module defines the building blocks every table pipeline is made of.
//!
//! ## Key Types
//!
//! - [`FetchState`]: What a pipeline stage publishes: a loading flag plus the latest result.
//! - [`DataGetter`]: The stream-in/stream-out contract shared by fetchers and decorators.
//! - [`Fetch`]: The single-request contract of an external data source.
//! - [`FnFetch`], [`WithCount`]: Adapters that plug ordinary async functions into [`Fetch`].

use std::fmt::Debug;
use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;

use super::feed::Feed;
use crate::model::{TableDataParams, TableDataWithCount};

// =============================================================================
// 1. THE STATE (what flows between stages)
// =============================================================================

/// The published state of a pipeline stage.
///
/// `loading` and `result` are independent: while a new request is in flight the
/// previous result stays visible. `result` is `None` only before the first request of
/// a composition has finished.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<D, E> {
    pub loading: bool,
    pub result: Option<Result<D, E>>,
}

impl<D, E> FetchState<D, E> {
    /// Loading, nothing to show yet.
    pub fn pending() -> Self {
        Self {
            loading: true,
            result: None,
        }
    }

    /// Finished with `result`.
    pub fn settled(result: Result<D, E>) -> Self {
        Self {
            loading: false,
            result: Some(result),
        }
    }

    /// Loading again, keeping the current result visible.
    pub fn reloading(self) -> Self {
        Self {
            loading: true,
            result: self.result,
        }
    }

    pub fn data(&self) -> Option<&D> {
        match &self.result {
            Some(Ok(data)) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match &self.result {
            Some(Err(error)) => Some(error),
            _ => None,
        }
    }

    /// Transforms successful data, passing errors and emptiness through untouched.
    pub fn map_data<R>(self, transform: impl FnOnce(D) -> R) -> FetchState<R, E> {
        FetchState {
            loading: self.loading,
            result: self.result.map(|result| result.map(transform)),
        }
    }
}

// =============================================================================
// 2. THE ABSTRACTIONS (stream contract and request contract)
// =============================================================================

/// Stream-to-stream contract implemented by fetchers and by every decorator.
///
/// # Architecture Note
/// A getter turns a feed of parameter snapshots into a feed of fetch states. Each call
/// to [`DataGetter::get`] builds one *composition*: the tasks, subscriptions and
/// in-flight requests behind the returned feed. That composition is created once and
/// shared by every clone of the returned feed, so adding UI readers never repeats a
/// request. It is torn down when the last clone is dropped.
///
/// Decorators take a getter and return a getter with the same contract, which is what
/// makes them stackable (see [`DataGetterExt`](crate::getters::DataGetterExt)).
pub trait DataGetter: Send + Sync + 'static {
    type Data: Clone + Send + Sync + 'static;
    type Error: Clone + Debug + Send + Sync + 'static;

    /// Builds a composition reading `params` and returns its output feed.
    ///
    /// Must be called from within a Tokio runtime.
    fn get(&self, params: Feed<TableDataParams>) -> Feed<FetchState<Self::Data, Self::Error>>;
}

/// A single request against an external source (typically an HTTP GET).
///
/// Implementations map the parameter snapshot to a query and return either the data
/// or an error value. They are never retried automatically.
#[async_trait]
pub trait Fetch: Send + Sync + 'static {
    type Data: Clone + Send + Sync + 'static;
    type Error: Clone + Debug + Send + Sync + 'static;

    async fn fetch(&self, params: TableDataParams) -> Result<Self::Data, Self::Error>;
}

// =============================================================================
// 3. ADAPTERS
// =============================================================================

/// [`Fetch`] backed by an async closure.
pub struct FnFetch<F, D, E> {
    call: F,
    _marker: PhantomData<fn() -> (D, E)>,
}

/// Wraps `call` so it can be used wherever a [`Fetch`] is expected.
///
/// ```rust
/// use table_dataflow::framework::fetch_fn;
///
/// let fetch = fetch_fn(|params: table_dataflow::model::TableDataParams| async move {
///     Ok::<_, String>(vec![params.page])
/// });
/// # let _ = fetch;
/// ```
pub fn fetch_fn<F, Fut, D, E>(call: F) -> FnFetch<F, D, E>
where
    F: Fn(TableDataParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<D, E>> + Send + 'static,
{
    FnFetch {
        call,
        _marker: PhantomData,
    }
}

#[async_trait]
impl<F, Fut, D, E> Fetch for FnFetch<F, D, E>
where
    F: Fn(TableDataParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<D, E>> + Send + 'static,
    D: Clone + Send + Sync + 'static,
    E: Clone + Debug + Send + Sync + 'static,
{
    type Data = D;
    type Error = E;

    async fn fetch(&self, params: TableDataParams) -> Result<D, E> {
        (self.call)(params).await
    }
}

/// Turns a fetch returning a plain list into one returning [`TableDataWithCount`],
/// the shape client-side pagination works on.
pub struct WithCount<F> {
    inner: F,
}

impl<F> WithCount<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<F, R> Fetch for WithCount<F>
where
    F: Fetch<Data = Vec<R>>,
    R: Clone + Send + Sync + 'static,
{
    type Data = TableDataWithCount<R>;
    type Error = F::Error;

    async fn fetch(&self, params: TableDataParams) -> Result<Self::Data, Self::Error> {
        self.inner.fetch(params).await.map(TableDataWithCount::new)
    }
}
