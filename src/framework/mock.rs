//! # Mock Framework
//!
//! Utilities for testing pipelines without a real data source.
//!
//! [`MockFetch`] is a scripted [`Fetch`]: queue expectations with
//! [`MockFetch::expect_fetch`], run the pipeline, then call [`MockFetch::verify`].
//! A [`deferred`](FetchExpectationBuilder::deferred) expectation hands back a
//! [`Responder`] so a test decides *when* a request completes, which is how
//! cancellation and ordering are exercised.

use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::framework::Fetch;
use crate::model::TableDataParams;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// Represents an expected request and how it completes.
enum Expectation<D, E> {
    Ready(Result<D, E>),
    Deferred(oneshot::Receiver<Result<D, E>>),
}

/// A scripted fetch with expectation tracking for fluent testing.
///
/// # Example
/// ```ignore
/// let mock = MockFetch::<Vec<Todo>, FetchError>::new();
/// mock.expect_fetch().return_ok(todos);
/// let responder = mock.expect_fetch().deferred();
///
/// let table = TableStateProvider::new(BaseFetcher::new(mock.clone()), TableConfig::default());
/// // ...
/// mock.verify(); // Ensures all expectations were met
/// ```
pub struct MockFetch<D, E> {
    expectations: Arc<Mutex<VecDeque<Expectation<D, E>>>>,
    fallback: Arc<Mutex<Option<Result<D, E>>>>,
    requests: Arc<Mutex<Vec<TableDataParams>>>,
}

impl<D, E> Clone for MockFetch<D, E> {
    fn clone(&self) -> Self {
        Self {
            expectations: self.expectations.clone(),
            fallback: self.fallback.clone(),
            requests: self.requests.clone(),
        }
    }
}

impl<D, E> Default for MockFetch<D, E> {
    fn default() -> Self {
        Self {
            expectations: Arc::new(Mutex::new(VecDeque::new())),
            fallback: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<D, E> MockFetch<D, E> {
    /// Creates a new mock with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects one more request.
    pub fn expect_fetch(&self) -> FetchExpectationBuilder<D, E> {
        FetchExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    /// Answers every request without a queued expectation with `result`.
    pub fn otherwise_return(&self, result: Result<D, E>) {
        *self.fallback.lock().unwrap() = Some(result);
    }

    /// Number of requests received so far.
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Parameter snapshots of all requests received so far.
    pub fn requests(&self) -> Vec<TableDataParams> {
        self.requests.lock().unwrap().clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

/// Builder for `fetch` expectations.
pub struct FetchExpectationBuilder<D, E> {
    expectations: Arc<Mutex<VecDeque<Expectation<D, E>>>>,
}

impl<D, E> FetchExpectationBuilder<D, E> {
    /// Completes the request immediately with data.
    pub fn return_ok(self, data: D) {
        self.push(Expectation::Ready(Ok(data)));
    }

    /// Completes the request immediately with an error.
    pub fn return_err(self, error: E) {
        self.push(Expectation::Ready(Err(error)));
    }

    /// Keeps the request pending until the returned [`Responder`] answers it.
    pub fn deferred(self) -> Responder<D, E> {
        let (sender, receiver) = oneshot::channel();
        self.push(Expectation::Deferred(receiver));
        Responder { sender }
    }

    fn push(self, expectation: Expectation<D, E>) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(expectation);
    }
}

/// Completes a deferred request.
pub struct Responder<D, E> {
    sender: oneshot::Sender<Result<D, E>>,
}

impl<D, E> Responder<D, E> {
    /// `true` once the request was abandoned by its caller.
    pub fn is_cancelled(&self) -> bool {
        self.sender.is_closed()
    }

    /// Delivers data. Returns `false` if nobody was waiting any more.
    pub fn respond_ok(self, data: D) -> bool {
        self.sender.send(Ok(data)).is_ok()
    }

    /// Delivers an error. Returns `false` if nobody was waiting any more.
    pub fn respond_err(self, error: E) -> bool {
        self.sender.send(Err(error)).is_ok()
    }
}

#[async_trait]
impl<D, E> Fetch for MockFetch<D, E>
where
    D: Clone + Send + Sync + 'static,
    E: Clone + Debug + Send + Sync + 'static,
{
    type Data = D;
    type Error = E;

    async fn fetch(&self, params: TableDataParams) -> Result<D, E> {
        self.requests.lock().unwrap().push(params);
        let expectation = self.expectations.lock().unwrap().pop_front();

        match expectation {
            Some(Expectation::Ready(result)) => result,
            Some(Expectation::Deferred(receiver)) => match receiver.await {
                Ok(result) => result,
                // Responder dropped without answering: the request never completes.
                Err(_) => std::future::pending().await,
            },
            None => {
                let fallback = self.fallback.lock().unwrap().clone();
                match fallback {
                    Some(result) => result,
                    None => panic!("Unexpected fetch: no expectation left"),
                }
            }
        }
    }
}
